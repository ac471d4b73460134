use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use anyhow::Result;

use crate::config::{Config, OutputFormat};
use crate::core::Engine;

#[derive(Parser)]
#[command(name = "symdoc")]
#[command(about = "Extracts structured documentation from annotated JavaScript sources")]
#[command(version)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Flags deciding which symbols are kept
#[derive(Args, Debug, Default)]
pub struct FilterArgs {
    /// Include symbols tagged as private
    #[arg(short = 'p', long = "private")]
    pub include_private: bool,

    /// Include all functions, even undocumented ones
    #[arg(short = 'a', long = "allfunctions")]
    pub all_functions: bool,

    /// Include all functions, even undocumented, underscored ones
    #[arg(short = 'A', long = "Allfunctions")]
    pub all_functions_underscored: bool,

    /// Descend this many levels into source directories
    #[arg(short = 'r', long = "recurse")]
    pub recurse: Option<usize>,

    /// Scan source files with the given extensions
    #[arg(short = 'x', long = "ext", value_delimiter = ',')]
    pub extensions: Vec<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a default configuration file
    Init {
        /// Target directory (defaults to current directory)
        #[arg(short, long)]
        path: Option<PathBuf>,
    },

    /// Resolve sources and publish documentation
    Generate {
        /// Source files or directories (defaults to the configured source dirs)
        sources: Vec<PathBuf>,

        #[command(flatten)]
        filters: FilterArgs,

        /// Directory holding file.tera and index.tera
        #[arg(short, long)]
        template: Option<PathBuf>,

        /// Output directory
        #[arg(short, long)]
        directory: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,
    },

    /// Resolve sources and print the symbol graph as JSON
    Inspect {
        /// Source files or directories (defaults to the configured source dirs)
        sources: Vec<PathBuf>,

        #[command(flatten)]
        filters: FilterArgs,
    },
}

impl FilterArgs {
    /// Command-line flags win over the configuration file.
    pub fn apply(self, config: &mut Config) {
        config.resolve.include_private |= self.include_private;
        config.resolve.all_functions |= self.all_functions;
        config.resolve.all_functions_underscored |= self.all_functions_underscored;

        if self.recurse.is_some() {
            config.project.recurse_depth = self.recurse;
        }
        if !self.extensions.is_empty() {
            config.project.extensions = self.extensions;
        }
    }
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        let mut config = Config::load_or_default(self.config.as_deref())?;

        match self.command {
            Commands::Init { path } => {
                let written = Engine::init(path)?;
                println!("{}", written.display());
                Ok(())
            }
            Commands::Generate { sources, filters, template, directory, format } => {
                filters.apply(&mut config);
                if template.is_some() {
                    config.output.template_dir = template;
                }
                if let Some(directory) = directory {
                    config.output.directory = directory;
                }
                if let Some(format) = format {
                    config.output.format = format;
                }

                let mut engine = Engine::new(config)?;
                engine.generate(sources).await?;
                Ok(())
            }
            Commands::Inspect { sources, filters } => {
                filters.apply(&mut config);

                let mut engine = Engine::new(config)?;
                println!("{}", engine.inspect(sources).await?);
                Ok(())
            }
        }
    }
}
