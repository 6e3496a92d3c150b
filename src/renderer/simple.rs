use crate::data::{DataProvider, Individual};
use crate::layout::{EntryBox, PositionedNode, composite};
use crate::text_metrics::{TextMeasurer, TextStyle};
use crate::theme::Theme;

use super::{NodeRenderer, text_element};

const MIN_HEIGHT: f32 = 27.0;
const MIN_WIDTH: f32 = 50.0;
const YEARS_HEIGHT: f32 = 14.0;

fn name(indi: &Individual) -> String {
    indi.full_name()
}

fn years(indi: &Individual) -> String {
    let birth = indi.birth.as_ref().and_then(|event| event.year());
    let death = indi.death.as_ref().and_then(|event| event.year());
    if birth.is_none() && death.is_none() {
        return String::new();
    }
    let part = |year: Option<i32>| year.map(|year| year.to_string()).unwrap_or_default();
    format!("{} \u{2013} {}", part(birth), part(death))
}

/// Name and life years only.
#[derive(Debug)]
pub struct SimpleRenderer {
    theme: Theme,
    measurer: TextMeasurer,
}

impl SimpleRenderer {
    pub fn new(theme: Theme, measurer: TextMeasurer) -> Self {
        Self { theme, measurer }
    }

    fn render_indi(out: &mut String, entry: &EntryBox, offset: (f32, f32), data: &dyn DataProvider) {
        let (label, life) = data
            .indi(&entry.id)
            .map(|indi| (name(indi), years(indi)))
            .unwrap_or_default();
        out.push_str(&format!(
            "<g transform=\"translate({:.2}, {:.2})\"><rect width=\"{:.2}\" height=\"{:.2}\"/>",
            offset.0, offset.1, entry.width, entry.height
        ));
        let center = entry.width / 2.0;
        out.push_str(&text_element(center, 17.0, "name", Some("middle"), &label));
        out.push_str(&text_element(center, 33.0, "details", Some("middle"), &life));
        out.push_str("</g>");
    }
}

impl NodeRenderer for SimpleRenderer {
    fn preferred_indi_size(&mut self, data: &dyn DataProvider, id: &str) -> (f32, f32) {
        let Some(indi) = data.indi(id) else {
            return (MIN_WIDTH, MIN_HEIGHT);
        };
        let life = years(indi);
        let width = (self.measurer.measure(&name(indi), TextStyle::Name) + 8.0)
            .max(self.measurer.measure(&life, TextStyle::Name))
            .max(MIN_WIDTH);
        let height = if life.is_empty() {
            MIN_HEIGHT
        } else {
            MIN_HEIGHT + YEARS_HEIGHT
        };
        (width, height)
    }

    fn render_node(
        &mut self,
        node: &PositionedNode,
        data: &dyn DataProvider,
        horizontal: bool,
    ) -> String {
        let mut out = String::from("<g class=\"simple\">");
        if let Some(indi) = &node.indi {
            Self::render_indi(&mut out, indi, composite::indi_box_origin(node, horizontal), data);
        }
        if let Some(spouse) = &node.spouse {
            Self::render_indi(&mut out, spouse, composite::spouse_box_origin(node, horizontal), data);
        }
        out.push_str("</g>");
        out
    }

    fn stylesheet(&self) -> String {
        format!(
            ".simple text {{ font: 12px {font}; fill: {text}; }}\n\
             .simple .name {{ font-weight: bold; }}\n\
             .simple rect {{ fill: {fill}; stroke: {border}; }}\n",
            font = self.theme.font_family,
            text = self.theme.text_color,
            fill = self.theme.box_color,
            border = self.theme.border_color,
        )
    }

    fn reset(&mut self) {
        self.measurer.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::RecordStore;

    fn store() -> RecordStore {
        RecordStore::from_json(
            r#"{
              "indis": [
                {"id": "I1", "firstName": "Jan", "lastName": "Kowalski",
                 "birth": {"date": {"year": 1900}}, "death": {"date": {"year": 1970}}},
                {"id": "I2", "firstName": "Ewa", "death": {"date": {"year": 1980}}},
                {"id": "I3"}
              ]
            }"#,
        )
        .expect("valid records")
    }

    #[test]
    fn years_label() {
        let data = store();
        assert_eq!(years(data.indi("I1").expect("indi")), "1900 \u{2013} 1970");
        assert_eq!(years(data.indi("I2").expect("indi")), " \u{2013} 1980");
        assert_eq!(years(data.indi("I3").expect("indi")), "");
    }

    #[test]
    fn height_grows_only_with_years() {
        let data = store();
        let mut renderer = SimpleRenderer::new(Theme::classic(), TextMeasurer::new("sans-serif", true));
        assert_eq!(renderer.preferred_indi_size(&data, "I1").1, 41.0);
        assert_eq!(renderer.preferred_indi_size(&data, "I3"), (MIN_WIDTH, MIN_HEIGHT));
    }
}
