use std::fs;
use std::io::Read;
use std::path::PathBuf;

use chrono::NaiveDate;

use crate::cli::commands::*;
use crate::cli::output;
use crate::io::config_io;
use crate::io::store::PageStore;
use crate::session::Session;

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let json = cli.json;
    let store = open_store(cli.data_dir.as_deref())?;
    let mut session = Session::open(store, cli.page.as_deref());

    match cli.command {
        // No subcommand → show the active page
        None | Some(Commands::Show) => {
            output::print_page(&session, json);
            Ok(())
        }

        Some(Commands::Add(args)) => {
            let deadline = parse_cli_date(args.deadline.as_deref())?;
            let id = session.add_main(args.description, deadline)?;
            println!("added {}", id);
            Ok(())
        }
        Some(Commands::Sub(args)) => {
            let deadline = parse_cli_date(args.deadline.as_deref())?;
            let id = session.add_sub(&args.parent, args.description, deadline)?;
            println!("added {}", id);
            Ok(())
        }
        Some(Commands::Edit(args)) => {
            let current = session
                .find(&args.id)
                .ok_or_else(|| format!("task not found: {}", args.id))?;
            let description = args.description.unwrap_or_else(|| current.description.clone());
            let deadline = if args.clear_deadline {
                None
            } else {
                match args.deadline.as_deref() {
                    Some(raw) => parse_cli_date(Some(raw))?,
                    None => current.deadline,
                }
            };
            session.edit(&args.id, description, deadline)?;
            Ok(())
        }
        Some(Commands::Done(args)) => {
            session.toggle_completed(&args.id)?;
            Ok(())
        }
        Some(Commands::Fold(args)) => {
            session.toggle_collapsed(&args.id)?;
            Ok(())
        }
        Some(Commands::Rm(args)) => {
            session.delete(&args.id)?;
            println!("deleted {} (tw undo to restore)", args.id);
            Ok(())
        }
        Some(Commands::Mv(args)) => {
            if !session.reorder(&args.dragged, &args.target)? {
                println!("not siblings; nothing moved");
            }
            Ok(())
        }
        Some(Commands::Undo) => {
            if session.undo()? {
                println!("restored");
            } else {
                println!("nothing to undo");
            }
            Ok(())
        }
        Some(Commands::Completed) => {
            let shown = session.toggle_show_completed();
            println!(
                "completed tasks {}",
                if shown { "shown" } else { "hidden" }
            );
            Ok(())
        }

        Some(Commands::Pages) => {
            output::print_pages(&session, json);
            Ok(())
        }
        Some(Commands::Page(cmd)) => {
            match cmd.action {
                PageAction::Add { name } => {
                    session.add_page(&name)?;
                    println!("added page {}", name);
                }
                PageAction::Rm { name } => {
                    session.remove_page(&name)?;
                    println!("removed page {}", name);
                }
                PageAction::Rename { old, new } => {
                    session.rename_page(&old, &new)?;
                    println!("renamed page {} -> {}", old, new);
                }
                PageAction::Use { name } => {
                    session.switch_to(&name)?;
                    println!("switched to {}", name);
                }
                PageAction::Next => {
                    let name = session.next_page();
                    println!("switched to {}", name);
                }
                PageAction::Prev => {
                    let name = session.prev_page();
                    println!("switched to {}", name);
                }
            }
            Ok(())
        }

        Some(Commands::Export(args)) => {
            let payload = if args.all {
                session.export_all()
            } else {
                session.export_page()
            };
            match args.output {
                Some(path) => fs::write(&path, payload)
                    .map_err(|e| format!("could not write {}: {}", path, e))?,
                None => println!("{}", payload),
            }
            Ok(())
        }
        Some(Commands::Import(args)) => {
            let payload = read_payload(&args.file)?;
            if args.all {
                session.import_all(&payload)?;
                println!("imported {} pages", session.pages().len());
            } else {
                session.import_page(args.into.as_deref(), &payload)?;
                println!("imported into {}", session.active_page());
            }
            Ok(())
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Resolve the data directory: --data-dir flag, then config.toml, then the
/// XDG default.
fn open_store(flag: Option<&str>) -> Result<PageStore, Box<dyn std::error::Error>> {
    let dir = match flag {
        Some(dir) => PathBuf::from(dir),
        None => match config_io::read_config().data_dir {
            Some(dir) => PathBuf::from(dir),
            None => PageStore::default_dir(),
        },
    };
    Ok(PageStore::open(&dir)?)
}

fn parse_cli_date(raw: Option<&str>) -> Result<Option<NaiveDate>, String> {
    match raw {
        None => Ok(None),
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| format!("invalid date \"{}\" (expected YYYY-MM-DD)", raw)),
    }
}

fn read_payload(file: &str) -> Result<String, String> {
    if file == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .map_err(|e| format!("could not read stdin: {}", e))?;
        Ok(buf)
    } else {
        fs::read_to_string(file).map_err(|e| format!("could not read {}: {}", file, e))
    }
}
