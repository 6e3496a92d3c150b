use crate::hierarchy::LinkType;
use crate::layout::{ChartLayout, EntryBox, LinkKind};
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutDump {
    pub orientation: String,
    pub width: f32,
    pub height: f32,
    pub origin: [f32; 2],
    pub nodes: Vec<NodeDump>,
    pub links: Vec<LinkDump>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDump {
    pub id: String,
    pub generation: i32,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub indi: Option<BoxDump>,
    pub spouse: Option<BoxDump>,
    pub family: Option<BoxDump>,
    pub parent: Option<String>,
    pub link_from_parent: Option<LinkType>,
    pub duplicate_of: Option<String>,
    pub link_stubs: Vec<LinkType>,
    pub hidden_relatives: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoxDump {
    pub id: String,
    pub width: f32,
    pub height: f32,
    pub hidden_relatives: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkDump {
    pub from: String,
    pub to: String,
    pub kind: LinkKind,
    pub points: Vec<[f32; 2]>,
}

fn box_dump(entry: &EntryBox) -> BoxDump {
    BoxDump {
        id: entry.id.clone(),
        width: entry.width,
        height: entry.height,
        hidden_relatives: entry.hidden_relatives,
    }
}

impl LayoutDump {
    pub fn from_layout(layout: &ChartLayout) -> Self {
        let node_id = |index: usize| layout.nodes[index].id.clone();
        let nodes = layout
            .nodes
            .iter()
            .map(|node| NodeDump {
                id: node.id.clone(),
                generation: node.generation,
                x: node.x,
                y: node.y,
                width: node.width,
                height: node.height,
                indi: node.indi.as_ref().map(box_dump),
                spouse: node.spouse.as_ref().map(box_dump),
                family: node.family.as_ref().map(box_dump),
                parent: node.parent.map(node_id),
                link_from_parent: node.link_from_parent,
                duplicate_of: node.duplicate_of.clone(),
                link_stubs: node.link_stubs.clone(),
                hidden_relatives: node.hidden_relatives,
            })
            .collect();
        let links = layout
            .links
            .iter()
            .map(|link| LinkDump {
                from: node_id(link.from),
                to: node_id(link.to),
                kind: link.kind,
                points: link.points.iter().map(|(x, y)| [*x, *y]).collect(),
            })
            .collect();
        LayoutDump {
            orientation: if layout.horizontal { "horizontal" } else { "vertical" }.to_string(),
            width: layout.info.size.0,
            height: layout.info.size.1,
            origin: [layout.info.origin.0, layout.info.origin.1],
            nodes,
            links,
        }
    }
}

pub fn write_layout_dump(output: Option<&Path>, layout: &ChartLayout) -> anyhow::Result<()> {
    let dump = LayoutDump::from_layout(layout);
    match output {
        Some(path) => {
            let file = File::create(path)?;
            let writer = BufWriter::new(file);
            serde_json::to_writer_pretty(writer, &dump)?;
        }
        None => {
            println!("{}", serde_json::to_string_pretty(&dump)?);
        }
    }
    Ok(())
}
