use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use log::info;

use crate::behavior::{BehaviorKind, SignalRecord};
use crate::world::{Entity, World};

pub fn print_final_state(world: &World) {
    println!("Final entity states:");
    for entity in world.all_entities() {
        println!(" - {}", describe(&entity));
    }
}

fn describe(entity: &Entity) -> String {
    let mut line = format!(
        "{} {}",
        entity.name,
        if entity.hidden { "hidden" } else { "visible" }
    );
    if let Some(material) = entity.first_material() {
        let material = material.read();
        line.push_str(&format!(" material={}", material.name));
        if let Some(texture) = material.color_texture() {
            let texture = texture.read();
            line.push_str(&format!(
                " texture={}x{} uploads={}",
                texture.width(),
                texture.height(),
                texture.uploads()
            ));
        }
    }
    line
}

pub fn print_signals(world: &World, signals: &[SignalRecord]) {
    if signals.is_empty() {
        return;
    }
    println!("Signals:");
    for record in signals {
        let name = world
            .get(record.entity)
            .map(|entity| entity.name)
            .unwrap_or_else(|| record.entity.to_string());
        println!(" - {} {} {}", name, record.behavior, record.signal);
    }
}

/// Writes every text texture bound to an entity's first material as PNG.
/// Returns the number of files written.
pub fn dump_textures(world: &World, dir: &Path) -> Result<usize> {
    fs::create_dir_all(dir).with_context(|| format!("unable to create {}", dir.display()))?;
    let mut written = 0;
    for entity in world.all_entities() {
        let Some(material) = entity.first_material() else {
            continue;
        };
        let material = material.read();
        let Some(texture) = material.color_texture() else {
            continue;
        };
        let texture = texture.read();
        let Some(image) = texture.image() else {
            continue;
        };
        let path = dir.join(format!("{}.png", sanitize(&entity.name)));
        image
            .save(&path)
            .with_context(|| format!("failed to write {}", path.display()))?;
        info!("wrote {}", path.display());
        written += 1;
    }
    Ok(written)
}

fn sanitize(name: &str) -> String {
    name.chars()
        .map(|ch| if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' { ch } else { '_' })
        .collect()
}

pub fn print_behavior_catalog() {
    for kind in BehaviorKind::ALL {
        println!("{kind}");
        for def in kind.properties() {
            let default = def
                .default
                .map(|value| format!(" (default: {value})"))
                .unwrap_or_else(|| " (no default)".to_string());
            println!("  {}: {}{} - {}", def.name, def.kind, default, def.description);
        }
    }
}
