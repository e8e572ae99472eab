use anyhow::Result;
use chroma_core::WallpaperTarget;
use chromacli::ChromaCliApp;
use clap::{Parser, Subcommand};
use log::info;

#[derive(Parser)]
#[command(name = "chromacli")]
#[command(about = "Chroma - AI wallpaper generator")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, PartialEq)]
enum Command {
    /// List the gallery, newest first
    List,
    /// Generate a wallpaper from a prompt and add it to the gallery
    Generate {
        #[arg(required = true, num_args = 1..)]
        prompt: Vec<String>,
    },
    /// Ask for a random prompt idea
    Idea,
    /// Delete a wallpaper by number or id
    Delete { id: String },
    /// Save a wallpaper to the Pictures library
    Export { id: String },
    /// Apply a wallpaper to the desktop
    Wallpaper {
        id: String,
        /// home, lock or both
        #[arg(long, default_value = "both")]
        target: WallpaperTarget,
    },
    /// Forget every record and delete the downloaded images
    ClearCache,
    /// Interactive numbered menu
    Menu,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let mut app = ChromaCliApp::new()?;
    info!("Gallery loaded with {} items", app.refresh().len());

    match cli.command.unwrap_or(Command::Menu) {
        Command::List => app.print_gallery(),
        Command::Generate { prompt } => {
            app.generate(&prompt.join(" "))?;
        }
        Command::Idea => println!("{}", app.surprise_me()?),
        Command::Delete { id } => app.delete(&id)?,
        Command::Export { id } => app.export(&id)?,
        Command::Wallpaper { id, target } => app.set_wallpaper(&id, target)?,
        Command::ClearCache => {
            app.clear_cache();
        }
        Command::Menu => {
            println!("Chroma started successfully!");
            app.run()?;
        }
    }

    Ok(())
}
