use std::env;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};

use scene_behaviors::app::{dump_textures, print_behavior_catalog, print_final_state, print_signals};
use scene_behaviors::{EventPayload, Runtime, Scene, SoftwareHost};

const USAGE: &str = "Usage: scene-behaviors <scene.xml> [--click NAME]... [--emit EVENT[=VALUE]]... \
[--update-text NAME=TEXT]... [--dump-textures DIR] [--system-fonts] | --list-behaviors";

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("Error: {err:?}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = CliOptions::parse(env::args().skip(1))?;
    let Some(path) = options.path else {
        print_behavior_catalog();
        return Ok(());
    };

    let xml = fs::read_to_string(&path)
        .with_context(|| format!("failed to read scene {}", path.display()))?;
    let scene = Scene::from_xml(&xml).context("failed to parse scene XML")?;
    println!(
        "Loaded scene with {} entities ({} behaviors)",
        scene.entities.len(),
        scene.behavior_count()
    );
    for entity in &scene.entities {
        let kinds: Vec<_> = entity
            .behaviors
            .iter()
            .map(|behavior| behavior.kind.as_str())
            .collect();
        println!(" - {} [{}]", entity.name, kinds.join(", "));
    }

    let host = if options.system_fonts {
        SoftwareHost::with_system_fonts()
    } else {
        SoftwareHost::new()
    };
    log::debug!("font library: {:?}", host.fonts());
    let mut runtime = Runtime::from_scene(&scene, Arc::new(host))?;
    let count = runtime.start().context("failed to start behaviors")?;
    println!("Started {count} behavior(s)");

    for action in &options.actions {
        let applied = match action {
            Action::Click(name) => runtime.click(name),
            Action::Emit(name, payload) => runtime.emit_global(name, payload.clone()),
            Action::UpdateText(name, text) => runtime.update_text(name, text),
        };
        applied.with_context(|| format!("failed to apply {action:?}"))?;
    }

    print_final_state(runtime.world());
    print_signals(runtime.world(), runtime.signals());

    if let Some(dir) = &options.dump_dir {
        let written = dump_textures(runtime.world(), dir)?;
        println!("Wrote {written} texture(s) to {}", dir.display());
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq)]
enum Action {
    Click(String),
    Emit(String, EventPayload),
    UpdateText(String, String),
}

#[derive(Debug, Default)]
struct CliOptions {
    path: Option<PathBuf>,
    actions: Vec<Action>,
    dump_dir: Option<PathBuf>,
    system_fonts: bool,
}

impl CliOptions {
    fn parse(args: impl IntoIterator<Item = String>) -> Result<Self> {
        let mut args = args.into_iter();
        let mut options = Self::default();
        let mut list_behaviors = false;

        while let Some(arg) = args.next() {
            let mut value = |flag: &str| {
                args.next()
                    .ok_or_else(|| anyhow!("{flag} expects a value\n{USAGE}"))
            };
            match arg.as_str() {
                "--list-behaviors" => list_behaviors = true,
                "--system-fonts" => options.system_fonts = true,
                "--click" => options.actions.push(Action::Click(value("--click")?)),
                "--emit" => {
                    let pair = value("--emit")?;
                    let (name, payload) = match pair.split_once('=') {
                        Some((name, raw)) => (name.to_string(), EventPayload::from_arg(Some(raw))),
                        None => (pair, EventPayload::Empty),
                    };
                    options.actions.push(Action::Emit(name, payload));
                }
                "--update-text" => {
                    let pair = value("--update-text")?;
                    let (name, text) = pair
                        .split_once('=')
                        .ok_or_else(|| anyhow!("--update-text expects NAME=TEXT, got {pair}"))?;
                    options
                        .actions
                        .push(Action::UpdateText(name.to_string(), text.to_string()));
                }
                "--dump-textures" => {
                    options.dump_dir = Some(PathBuf::from(value("--dump-textures")?));
                }
                other if other.starts_with("--") => {
                    return Err(anyhow!("Unknown argument: {other}\n{USAGE}"));
                }
                other => {
                    if options.path.is_some() {
                        return Err(anyhow!("Unexpected argument: {other}\n{USAGE}"));
                    }
                    options.path = Some(PathBuf::from(other));
                }
            }
        }

        if options.path.is_none() && !list_behaviors {
            return Err(anyhow!(USAGE));
        }
        if list_behaviors {
            options.path = None;
        }
        Ok(options)
    }
}
