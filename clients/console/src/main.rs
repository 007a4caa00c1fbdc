use std::io::{self, BufRead, Write};
use std::time::Instant;

use clap::Parser;

use crate::api::{ApiClient, ApiError};
use crate::form::ContactForm;
use crate::list::{ContactList, SortKey};

mod api;
mod form;
mod list;

/// 📇 ContactDB Console, an interactive prompt for managing contacts over the REST API
///
/// Start the server first: `contactdb --data ./data`
#[derive(Parser, Debug)]
struct Cli {
    /// Base URL of the contactdb REST server
    #[clap(short, long, default_value = "http://127.0.0.1:9000")]
    server: String,
}

fn main() -> anyhow::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let args = Cli::parse();

    let api = ApiClient::new(&args.server);
    let mut form = ContactForm::new();
    let mut contact_list = ContactList::new();
    let mut refresh_trigger: u64 = 0;

    println!("ContactDB console, server: {}", args.server);
    println!("Type 'help' for commands");

    fetch(&mut contact_list, refresh_trigger, &api);
    render(&contact_list);

    loop {
        let Some(input) = prompt("> ")? else { break };

        let (command, argument) = match input.split_once(' ') {
            Some((command, argument)) => (command, argument.trim()),
            None => (input.as_str(), ""),
        };

        match (command, argument) {
            ("", _) => continue,
            ("quit" | "q" | "exit", _) => break,
            ("help", _) => print_help(),
            ("add", _) => add_contact(&mut form, &api, &mut refresh_trigger)?,
            ("list", _) => {
                fetch(&mut contact_list, refresh_trigger, &api);
                render(&contact_list);
            }
            ("refresh", _) => {
                refresh_trigger += 1;
                fetch(&mut contact_list, refresh_trigger, &api);
                render(&contact_list);
            }
            ("sort", key_text) => match key_text.parse::<SortKey>() {
                Ok(sort_key) => {
                    contact_list.set_sort_key(sort_key);
                    fetch(&mut contact_list, refresh_trigger, &api);
                    render(&contact_list);
                }
                Err(_) => println!("Usage: sort <date|name|email>"),
            },
            ("delete", index_text) => delete_contact(index_text, &mut contact_list, &api)?,
            _ => println!("Unknown command, type 'help'"),
        }
    }

    Ok(())
}

fn prompt(label: &str) -> anyhow::Result<Option<String>> {
    print!("{}", label);
    io::stdout().flush()?;

    let mut line = String::new();

    if io::stdin().lock().read_line(&mut line)? == 0 {
        return Ok(None);
    }

    Ok(Some(line.trim().to_string()))
}

fn print_help() {
    println!("Commands:");
    println!("  add              Add a new contact");
    println!("  list             Show contacts");
    println!("  sort <key>       Sort by date, name, or email");
    println!("  delete <n>       Delete the contact at position n");
    println!("  refresh          Refetch from the server");
    println!("  help             This message");
    println!("  quit             Exit");
}

fn fetch(contact_list: &mut ContactList, refresh_trigger: u64, api: &ApiClient) {
    contact_list.sync(refresh_trigger, || {
        api.list_contacts().map_err(|error| {
            log::error!("Error fetching contacts: {}", error);

            "Failed to fetch contacts".to_string()
        })
    });
}

fn render(contact_list: &ContactList) {
    if contact_list.is_loading() {
        println!("Loading contacts...");

        return;
    }

    if let Some(error) = contact_list.error() {
        println!("{}", error);
    }

    let contacts = contact_list.sorted();

    if contacts.is_empty() {
        println!("No contacts yet. Add one with 'add' to get started!");
    } else {
        println!("Sorted by: {}", contact_list.sort_key());

        for (position, contact) in contacts.iter().enumerate() {
            let message: &str = if contact.message.is_empty() {
                "-"
            } else {
                &contact.message
            };

            println!(
                "{:>2}. {}  <{}>  {}  {}  {}",
                position + 1,
                contact.name,
                contact.email,
                contact.phone,
                message,
                contact.created_at.format("%Y-%m-%d %H:%M")
            );
        }
    }

    println!("Total: {} contact(s)", contact_list.visible_count());
}

fn add_contact(
    form: &mut ContactForm,
    api: &ApiClient,
    refresh_trigger: &mut u64,
) -> anyhow::Result<()> {
    let Some(name) = prompt("Name: ")? else {
        return Ok(());
    };
    form.set_name(name);

    let Some(email) = prompt("Email: ")? else {
        return Ok(());
    };
    form.set_email(email);

    let Some(phone) = prompt("Phone: ")? else {
        return Ok(());
    };
    form.set_phone(phone);

    let Some(message) = prompt("Message (optional): ")? else {
        return Ok(());
    };
    form.set_message(message);

    let Some(draft) = form.begin_submit() else {
        for error in form.errors().iter() {
            println!("  {}", error);
        }

        return Ok(());
    };

    println!("Adding...");

    let result = api.create_contact(&draft).map_err(|error| match error {
        ApiError::Server(message) => message,
        ApiError::Transport(transport) => {
            log::error!("Error adding contact: {}", transport);

            "Failed to add contact".to_string()
        }
    });

    form.complete_submit(result);

    if let Some(banner) = form.success_banner(Instant::now()) {
        println!("{}", banner);
        *refresh_trigger += 1;
    } else if let Some(submit_error) = form.submit_error() {
        println!("{}", submit_error);
    }

    Ok(())
}

fn delete_contact(
    index_text: &str,
    contact_list: &mut ContactList,
    api: &ApiClient,
) -> anyhow::Result<()> {
    let Ok(position) = index_text.parse::<usize>() else {
        println!("Usage: delete <n>");

        return Ok(());
    };

    let visible = contact_list.sorted();

    let Some(contact) = position.checked_sub(1).and_then(|index| visible.get(index)) else {
        println!("No contact at position {}", position);

        return Ok(());
    };

    let question = format!(
        "Are you sure you want to delete this contact? ({}) [y/N] ",
        contact.name
    );

    let Some(answer) = prompt(&question)? else {
        return Ok(());
    };

    if !answer.eq_ignore_ascii_case("y") {
        return Ok(());
    }

    match api.delete_contact(&contact.id) {
        Ok(deleted) => {
            contact_list.remove_local(&deleted.id);
            println!("Contact deleted successfully");
        }
        Err(error) => {
            log::error!("Error deleting contact: {}", error);
            contact_list.set_error("Failed to delete contact".to_string());
        }
    }

    render(contact_list);

    Ok(())
}
