pub mod consts {
    pub mod consts;
}

pub mod model {
    pub mod contact;
    pub mod statement;
    pub mod validate;
}

pub mod persistence;

pub mod store {
    pub mod commands;
    pub mod handle;
    pub mod options;
    pub mod store;
    pub mod table;
}
