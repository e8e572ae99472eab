pub use crate::app::ChromaCliApp;

mod app {
    use anyhow::{bail, Result};
    use chroma_core::*;
    use std::io::{self, BufRead, Write};

    pub struct ChromaCliApp {
        chroma: Chroma,
        gallery: GalleryController,
    }

    impl ChromaCliApp {
        pub fn new() -> Result<Self> {
            Ok(Self::from_chroma(Chroma::new()?))
        }

        pub fn from_chroma(chroma: Chroma) -> Self {
            let gallery = chroma.controller();
            Self { chroma, gallery }
        }

        pub fn refresh(&mut self) -> &[WallpaperImage] {
            self.gallery.activate()
        }

        /// `selector` is either a 1-based position in the gallery or a record id.
        pub fn resolve(&self, selector: &str) -> Option<WallpaperImage> {
            let selector = selector.trim();
            let images = self.gallery.images();
            if let Ok(position) = selector.parse::<usize>() {
                if (1..=images.len()).contains(&position) {
                    return Some(images[position - 1].clone());
                }
            }
            self.gallery.find(selector).cloned()
        }

        pub fn list_lines(&self) -> Vec<String> {
            self.gallery
                .images()
                .iter()
                .enumerate()
                .map(|(i, image)| {
                    format!(
                        "{:>2}. [{}] {} ({}px) {}",
                        i + 1,
                        image.id,
                        shorten(&image.prompt, 48),
                        tile_height(&image.id),
                        image.timestamp
                    )
                })
                .collect()
        }

        pub fn print_gallery(&self) {
            if self.gallery.is_empty() {
                println!("Gallery is empty. Generate your first wallpaper!");
                return;
            }
            println!("{} Items", self.gallery.item_count());
            for line in self.list_lines() {
                println!("{}", line);
            }
        }

        pub fn generate(&mut self, prompt: &str) -> Result<WallpaperImage> {
            println!("Generating wallpaper...");
            match self.gallery.generate(prompt) {
                GenerateOutcome::Created(image) => {
                    println!("Created {} -> {}", image.id, image.url);
                    Ok(image)
                }
                GenerateOutcome::EmptyPrompt => bail!("Please enter a prompt"),
                GenerateOutcome::Failed => bail!("Failed to generate image. Please try again."),
            }
        }

        pub fn surprise_me(&self) -> Result<String> {
            match self.gallery.surprise_me() {
                Some(idea) => Ok(idea),
                None => bail!("Failed to generate an idea. Try again!"),
            }
        }

        pub fn delete(&mut self, selector: &str) -> Result<()> {
            let Some(image) = self.resolve(selector) else {
                println!("No wallpaper matches '{}', nothing deleted", selector.trim());
                return Ok(());
            };
            if self.gallery.delete_image(&image.id) {
                println!("Deleted {}", image.id);
            }
            Ok(())
        }

        pub fn export(&mut self, selector: &str) -> Result<()> {
            let mut preview = self.preview(selector)?;
            match preview.save_current(self.chroma.exporter()) {
                Some(notice) => bail!("{}: {}", notice.title, notice.message),
                None => {
                    println!("Saved to your photo library");
                    Ok(())
                }
            }
        }

        pub fn set_wallpaper(&mut self, selector: &str, target: WallpaperTarget) -> Result<()> {
            let mut preview = self.preview(selector)?;
            match preview.set_current_wallpaper(self.chroma.exporter(), target) {
                Some(notice) if notice.kind == NoticeKind::Success => {
                    println!("{}: {}", notice.title, notice.message);
                    Ok(())
                }
                Some(notice) => bail!("{}: {}", notice.title, notice.message),
                None => bail!("Wallpaper could not be applied to this image"),
            }
        }

        pub fn clear_cache(&mut self) -> usize {
            let deleted = self.gallery.clear_cache();
            println!("Cleared gallery and deleted {} image files", deleted);
            deleted
        }

        fn preview(&mut self, selector: &str) -> Result<PreviewSession> {
            // remote urls and files outside the gallery are previewed as-is
            if selector.contains("://") {
                return Ok(PreviewSession::open_ephemeral(selector.trim(), ""));
            }
            self.refresh();
            let Some(image) = self.resolve(selector) else {
                bail!("Image not found: {}", selector.trim());
            };
            Ok(self.chroma.open_preview(&image.id))
        }

        pub fn show_menu(&self) -> Result<()> {
            println!("\n=== Chroma - AI Wallpaper Studio ===");
            println!("Gallery: {} items", self.gallery.item_count());
            if let Some(newest) = self.gallery.images().first() {
                println!("Newest: {}", shorten(&newest.prompt, 60));
            }
            println!();
            println!("1. Generate wallpaper");
            println!("2. Surprise me (prompt idea)");
            println!("3. List gallery");
            println!("4. Save wallpaper to photo library");
            println!("5. Set as wallpaper");
            println!("6. Delete wallpaper");
            println!("7. Clear cache");
            println!("8. Exit");
            print!("\nSelect an option (1-8): ");
            io::stdout().flush()?;
            Ok(())
        }

        pub fn run(&mut self) -> Result<()> {
            let stdin = io::stdin();
            let mut input = stdin.lock();
            let mut last_idea: Option<String> = None;

            loop {
                self.refresh();
                self.show_menu()?;

                let Some(choice) = read_line(&mut input)? else {
                    break;
                };
                let outcome = match choice.as_str() {
                    "1" => {
                        let hint = last_idea
                            .as_deref()
                            .map(|idea| format!(" [enter for: {}]", shorten(idea, 40)))
                            .unwrap_or_default();
                        let prompt = ask(&mut input, &format!("Prompt{}: ", hint))?;
                        let prompt = match (prompt.is_empty(), last_idea.take()) {
                            (true, Some(idea)) => idea,
                            _ => prompt,
                        };
                        self.generate(&prompt).map(|_| ())
                    }
                    "2" => self.surprise_me().map(|idea| {
                        println!("Idea: {}", idea);
                        last_idea = Some(idea);
                    }),
                    "3" => {
                        self.print_gallery();
                        Ok(())
                    }
                    "4" => {
                        let selector = ask(&mut input, "Number or id to save: ")?;
                        self.export(&selector)
                    }
                    "5" => {
                        let selector = ask(&mut input, "Number or id to apply: ")?;
                        let target = ask(&mut input, "Target (home/lock/both) [both]: ")?;
                        let target = if target.is_empty() {
                            Ok(WallpaperTarget::Both)
                        } else {
                            target.parse()
                        };
                        target.and_then(|target| self.set_wallpaper(&selector, target))
                    }
                    "6" => {
                        let selector = ask(&mut input, "Number or id to delete: ")?;
                        self.delete(&selector)
                    }
                    "7" => {
                        let confirm = ask(&mut input, "Delete all wallpapers? (y/N): ")?;
                        if confirm.eq_ignore_ascii_case("y") {
                            self.clear_cache();
                        }
                        Ok(())
                    }
                    "8" => {
                        println!("Exiting Chroma...");
                        break;
                    }
                    _ => {
                        println!("Invalid option. Please select 1-8.");
                        Ok(())
                    }
                };

                if let Err(e) = outcome {
                    eprintln!("{}", e);
                }
            }

            Ok(())
        }
    }

    fn read_line<R: BufRead>(input: &mut R) -> Result<Option<String>> {
        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn ask<R: BufRead>(input: &mut R, question: &str) -> Result<String> {
        print!("{}", question);
        io::stdout().flush()?;
        Ok(read_line(input)?.unwrap_or_default())
    }

    pub(crate) fn shorten(text: &str, max_chars: usize) -> String {
        if text.chars().count() > max_chars {
            format!("{}...", text.chars().take(max_chars).collect::<String>())
        } else {
            text.to_string()
        }
    }

}
