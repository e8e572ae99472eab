use anyhow::{anyhow, bail, Result};
use log::{info, warn};
use std::path::Path;
use std::process::Command;

use crate::export::WallpaperTarget;
use crate::services::WallpaperService;

/// Desktop wallpaper through the `wallpaper` crate, with per-desktop
/// command fallbacks on Linux. Desktops have no separate lock screen image,
/// so `Lock` is refused and `Both` only changes the desktop.
#[derive(Debug, Clone, Copy, Default)]
pub struct DesktopWallpaper;

impl WallpaperService for DesktopWallpaper {
    fn set_wallpaper_from_path(&self, file_path: &Path, target: WallpaperTarget) -> Result<()> {
        if target == WallpaperTarget::Lock {
            bail!("Lock screen wallpaper is not supported on this platform");
        }
        if target == WallpaperTarget::Both {
            warn!("Lock screen is not managed on this platform, setting the desktop only");
        }

        let file_loc = file_path.to_string_lossy();
        match wallpaper::set_from_path(&file_loc) {
            Ok(()) => {
                info!("Wallpaper set successfully to: {}", file_loc);
                Ok(())
            }
            Err(e) => {
                warn!("wallpaper crate failed for {}: {}", file_loc, e);
                if cfg!(target_os = "linux") && set_wallpaper_linux_fallback(file_path)? {
                    info!("Wallpaper set through desktop fallback: {}", file_loc);
                    return Ok(());
                }
                Err(anyhow!("Failed to set wallpaper: {}", e))
            }
        }
    }
}

pub fn get_desktop_environment() -> String {
    desktop_environment_from(|name| std::env::var(name).ok())
}

fn desktop_environment_from<F>(lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    const KNOWN: &[&str] = &[
        "gnome", "unity", "cinnamon", "mate", "xfce4", "lxde", "fluxbox", "blackbox", "openbox",
        "icewm", "jwm", "afterstep", "trinity", "kde",
    ];
    // (session prefix, desktop) checked in order
    const DERIVED: &[(&str, &str)] = &[
        ("xubuntu", "xfce4"),
        ("ubuntustudio", "kde"),
        ("ubuntu", "gnome"),
        ("lubuntu", "lxde"),
        ("kubuntu", "kde"),
        ("plasma", "kde"),
    ];

    if let Some(session) = lookup("DESKTOP_SESSION").map(|s| s.to_lowercase()) {
        if KNOWN.contains(&session.as_str()) {
            return session;
        }
        if session.contains("xfce") {
            return "xfce4".to_string();
        }
        if let Some((_, desktop)) = DERIVED.iter().find(|(prefix, _)| session.starts_with(prefix)) {
            return desktop.to_string();
        }
    }

    if lookup("KDE_FULL_SESSION").as_deref() == Some("true") {
        return "kde".to_string();
    }
    if lookup("GNOME_DESKTOP_SESSION_ID").is_some() {
        return "gnome".to_string();
    }

    "unknown".to_string()
}

/// Commands that point the given desktop at `file_loc`, run in order.
fn fallback_commands(desktop: &str, file_loc: &str) -> Vec<Vec<String>> {
    let cmd = |args: &[&str]| args.iter().map(|a| a.to_string()).collect::<Vec<_>>();
    let uri = format!("file://{}", file_loc);

    match desktop {
        "gnome" | "unity" | "cinnamon" => vec![
            cmd(&["gsettings", "set", "org.gnome.desktop.background", "picture-uri", uri.as_str()]),
            cmd(&["gsettings", "set", "org.gnome.desktop.background", "picture-uri-dark", uri.as_str()]),
        ],
        "mate" => vec![cmd(&["gsettings", "set", "org.mate.background", "picture-filename", file_loc])],
        "xfce4" => vec![
            cmd(&["xfconf-query", "-c", "xfce4-desktop", "-p", "/backdrop/screen0/monitor0/image-path", "-s", file_loc]),
            cmd(&["xfconf-query", "-c", "xfce4-desktop", "-p", "/backdrop/screen0/monitor0/image-show", "-s", "true"]),
            cmd(&["xfdesktop", "--reload"]),
        ],
        "kde" => vec![cmd(&["plasma-apply-wallpaperimage", file_loc])],
        "lxde" => vec![cmd(&["pcmanfm", "--set-wallpaper", file_loc, "--wallpaper-mode=scaled"])],
        "fluxbox" | "jwm" | "openbox" | "afterstep" => vec![cmd(&["fbsetbg", file_loc])],
        "icewm" => vec![cmd(&["icewmbg", file_loc])],
        "blackbox" => vec![cmd(&["bsetbg", "-full", file_loc])],
        _ => Vec::new(),
    }
}

fn set_wallpaper_linux_fallback(file_path: &Path) -> Result<bool> {
    let file_loc = file_path.to_string_lossy();
    let desktop_env = get_desktop_environment();
    let commands = fallback_commands(&desktop_env, &file_loc);

    if commands.is_empty() {
        warn!("Desktop environment '{}' not supported", desktop_env);
        return Ok(false);
    }

    let mut all_ok = true;
    for args in commands {
        let output = Command::new(&args[0]).args(&args[1..]).output()?;
        if !output.status.success() {
            warn!("{} exited with {}", args.join(" "), output.status);
            all_ok = false;
        }
    }
    Ok(all_ok)
}
