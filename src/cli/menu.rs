//! Interactive menu shown when `bo` is started without options.

use crate::error::Result;
use crate::options::{OptionDefinition, OptionRegistry};
use colored::*;
use dialoguer::{theme::ColorfulTheme, Input, Select};
use tracing::{error, info};

/// Builds the argument vector the menu dispatches for one selected option.
///
/// Values are attached to their flag (`--long=value`, `-svalue`) so a value
/// starting with `-` is not mistaken for another flag. An empty value for a
/// short-only option has to stay a separate token.
pub fn menu_args(program: &str, def: &OptionDefinition, value: Option<&str>) -> Vec<String> {
    let mut args = vec![program.to_string()];
    match (def.long().is_empty(), value) {
        (false, Some(value)) => args.push(format!("--{}={}", def.long(), value)),
        (false, None) => args.push(format!("--{}", def.long())),
        (true, Some(value)) if !value.is_empty() => {
            args.push(format!("-{}{}", def.short(), value))
        },
        (true, value) => {
            args.push(format!("-{}", def.short()));
            if let Some(value) = value {
                args.push(value.to_string());
            }
        },
    }
    args
}

fn prompt_value(def: &OptionDefinition) -> Result<String> {
    let value = Input::<String>::with_theme(&ColorfulTheme::default())
        .with_prompt(format!("{} ({})", def.description(), def))
        .interact_text()?;
    Ok(value)
}

/// Lets the user pick options one at a time until "Exit" is chosen or the
/// prompt is cancelled. Failures are reported and the loop continues.
pub async fn run_menu<Db: ?Sized + Sync>(registry: &OptionRegistry<Db>, db: &Db) -> Result<()> {
    let definitions: Vec<OptionDefinition> = registry.definitions().cloned().collect();
    let mut items: Vec<String> = definitions
        .iter()
        .map(|def| format!("{:<12} {}", def.to_string(), def.description()))
        .collect();
    items.push("Exit".to_string());
    let exit = items.len() - 1;

    println!("{}", format!("Welcome to {}!", registry.name()).cyan().bold());

    loop {
        let selection = Select::with_theme(&ColorfulTheme::default())
            .with_prompt("What would you like to do?")
            .items(&items)
            .default(0)
            .interact_opt()?
            .unwrap_or(exit);

        if selection == exit {
            println!("{}", "Exiting. Goodbye!".green());
            break;
        }

        let def = &definitions[selection];
        let value = if def.has_arg() {
            match prompt_value(def) {
                Ok(value) => Some(value),
                Err(e) => {
                    println!("{} {}", "Failed to get input:".red(), e);
                    continue;
                },
            }
        } else {
            None
        };

        println!("\n---\n");
        let args = menu_args(registry.name(), def, value.as_deref());
        info!("Menu selected {}", def);
        if let Err(e) = registry.dispatch(&args, db).await {
            error!("Menu command failed: {:?}", e);
            println!("{} {}", "Error executing command:".red(), e.to_string().red());
        }
        println!("\n---\n");
    }

    Ok(())
}
