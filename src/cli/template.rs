//! Export template CLI commands

use clap::Subcommand;

use crate::error::{FinReportError, FinReportResult};
use crate::export::ExportOptions;
use crate::store::{TemplatePatch, TemplateStore};

use super::export::FormatArg;
use super::CliContext;

/// Template subcommands
#[derive(Subcommand, Debug)]
pub enum TemplateCommands {
    /// List all templates
    List {
        /// Show the full option set per template
        #[arg(short, long)]
        verbose: bool,
    },

    /// Add a new template
    Add {
        /// Template name
        name: String,

        /// Export format
        #[arg(short, long, value_enum, default_value = "csv")]
        format: FormatArg,

        /// Description
        #[arg(short, long, default_value = "")]
        description: String,

        /// Export only the transaction slice
        #[arg(long)]
        transactions_only: bool,
    },

    /// Rename a template
    Rename {
        /// Template id
        id: String,
        /// New name
        name: String,
    },

    /// Remove a template
    Rm {
        /// Template id
        id: String,
    },
}

/// Handle a template command
pub fn handle_template_command(ctx: &CliContext, cmd: TemplateCommands) -> FinReportResult<()> {
    let templates = TemplateStore::new(ctx.store.clone(), ctx.ids.clone(), ctx.clock.clone());

    match cmd {
        TemplateCommands::List { verbose } => {
            let all = templates.list_templates();
            if all.is_empty() {
                println!("No templates.");
                return Ok(());
            }
            for template in all {
                let marker = if template.is_default { " [default]" } else { "" };
                println!(
                    "{}  {} ({}){}",
                    template.id, template.name, template.options.format, marker
                );
                if verbose {
                    println!("    {}", template.description);
                    println!("    {:?}", template.options);
                }
            }
        }

        TemplateCommands::Add {
            name,
            format,
            description,
            transactions_only,
        } => {
            let options = if transactions_only {
                ExportOptions::transactions_only(format.into())
            } else {
                ExportOptions::full(format.into())
            };
            let template = templates.create_template(&name, &description, options);
            println!("Created template {} ({})", template.name, template.id);
        }

        TemplateCommands::Rename { id, name } => {
            let updated = templates
                .update_template(
                    &id,
                    TemplatePatch {
                        name: Some(name),
                        ..Default::default()
                    },
                )
                .ok_or_else(|| FinReportError::template_not_found(&id))?;
            println!("Renamed template {} to {}", updated.id, updated.name);
        }

        TemplateCommands::Rm { id } => {
            if templates.delete_template(&id) {
                println!("Deleted template {}", id);
            } else {
                return Err(FinReportError::template_not_found(&id));
            }
        }
    }

    Ok(())
}
