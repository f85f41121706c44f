use anyhow::{anyhow, Context, Result};
use roxmltree::{Document, Node};
use serde::{Deserialize, Serialize};

use crate::behavior::{BehaviorKind, PropertySheet};
use crate::render::material::CLASSIC_SHADER_NAME;

/// Scene description: shared materials and the entities that use them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Scene {
    pub materials: Vec<MaterialDef>,
    pub entities: Vec<EntityDef>,
}

impl Scene {
    /// Parses the scene XML produced by the authoring tools.
    pub fn from_xml(xml: &str) -> Result<Self> {
        let document = Document::parse(xml).context("invalid scene XML")?;
        let root = document.root_element();

        let mut materials = Vec::new();
        for node in root.children().filter(|n| n.has_tag_name("material")) {
            let name = required_text(&node, "name").context("<material>")?;
            let shader =
                optional_text(&node, "shader").unwrap_or_else(|| CLASSIC_SHADER_NAME.to_string());
            materials.push(MaterialDef { name, shader });
        }

        let mut entities = Vec::new();
        for node in root.children().filter(|n| n.has_tag_name("entity")) {
            let name = required_text(&node, "name").context("<entity>")?;
            let entity = parse_entity(&node, name.clone())
                .with_context(|| format!("entity `{name}`"))?;
            entities.push(entity);
        }

        let scene = Self {
            materials,
            entities,
        };
        scene.validate()?;
        Ok(scene)
    }

    pub fn material(&self, name: &str) -> Option<&MaterialDef> {
        self.materials.iter().find(|material| material.name == name)
    }

    pub fn behavior_count(&self) -> usize {
        self.entities.iter().map(|entity| entity.behaviors.len()).sum()
    }

    fn validate(&self) -> Result<()> {
        for (index, entity) in self.entities.iter().enumerate() {
            if self.entities[..index]
                .iter()
                .any(|other| other.name == entity.name)
            {
                return Err(anyhow!("entity name `{}` is used twice", entity.name));
            }
            for material in entity.mesh.iter().flatten() {
                if self.material(material).is_none() {
                    return Err(anyhow!(
                        "entity `{}` references unknown material `{material}`",
                        entity.name
                    ));
                }
            }
        }
        Ok(())
    }
}

/// Shared material declared at the top of a scene.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialDef {
    pub name: String,
    pub shader: String,
}

/// Entity as described by the authoring tools.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityDef {
    pub name: String,
    /// Material names of the mesh renderer; `None` when the entity has no mesh.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mesh: Option<Vec<String>>,
    #[serde(default)]
    pub behaviors: Vec<BehaviorDef>,
}

/// Behavior attached to an entity, with its configured properties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BehaviorDef {
    #[serde(rename = "type")]
    pub kind: BehaviorKind,
    #[serde(default)]
    pub properties: PropertySheet,
}

fn parse_entity(node: &Node<'_, '_>, name: String) -> Result<EntityDef> {
    let mesh = node
        .children()
        .find(|child| child.has_tag_name("mesh"))
        .map(|mesh| {
            mesh.children()
                .filter(|child| child.has_tag_name("material"))
                .filter_map(|child| child.text())
                .map(|text| text.trim().to_string())
                .filter(|text| !text.is_empty())
                .collect::<Vec<_>>()
        });

    let mut behaviors = Vec::new();
    for behavior in node.children().filter(|n| n.has_tag_name("behavior")) {
        let kind = behavior
            .attribute("type")
            .ok_or_else(|| anyhow!("<behavior> is missing its type attribute"))?
            .parse::<BehaviorKind>()?;
        let mut properties = PropertySheet::new();
        for property in behavior.children().filter(|n| n.has_tag_name("property")) {
            let key = property
                .attribute("name")
                .ok_or_else(|| anyhow!("<property> is missing its name attribute"))?;
            // Values stay verbatim; typed accessors trim what they parse.
            properties.insert(key, property.text().unwrap_or_default());
        }
        behaviors.push(BehaviorDef { kind, properties });
    }

    Ok(EntityDef {
        name,
        mesh,
        behaviors,
    })
}

fn required_text(node: &Node<'_, '_>, tag: &str) -> Result<String> {
    optional_text(node, tag).ok_or_else(|| anyhow!("<{tag}> tag is missing"))
}

fn optional_text(node: &Node<'_, '_>, tag: &str) -> Option<String> {
    node.children()
        .find(|child| child.has_tag_name(tag))
        .and_then(|child| child.text())
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(|text| text.to_string())
}
