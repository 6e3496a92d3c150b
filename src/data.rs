use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::path::Path;

static POINTER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^@(.+)@$").unwrap());
static CALENDAR_ESCAPE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"@[^@]*@").unwrap());
static YEAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{1,4}$").unwrap());
static DAY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d\d?$").unwrap());

const MONTHS: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];
const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

#[derive(Debug, thiserror::Error)]
pub enum DataError {
    #[error("failed to read record file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse record JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Date {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qualifier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub month: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl Date {
    fn sort_key(&self) -> Option<(i32, u32, u32)> {
        let year = self.year?;
        Some((year, self.month.unwrap_or(0), self.day.unwrap_or(0)))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DateRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<Date>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<Date>,
}

/// A dated event (birth, death, marriage). Either `date` or `date_range`
/// is set once loading has finished; `gedcom_date` is the raw source form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<Date>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_range: Option<DateRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub place: Option<String>,
    #[serde(default)]
    pub confirmed: bool,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gedcom_date: Option<String>,
}

impl Event {
    pub fn has_date(&self) -> bool {
        self.date.is_some() || self.date_range.is_some()
    }

    pub fn year(&self) -> Option<i32> {
        self.date.as_ref().and_then(|date| date.year)
    }

    fn sort_key(&self) -> Option<(i32, u32, u32)> {
        if let Some(date) = &self.date {
            return date.sort_key();
        }
        let range = self.date_range.as_ref()?;
        range
            .from
            .as_ref()
            .and_then(Date::sort_key)
            .or_else(|| range.to.as_ref().and_then(Date::sort_key))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sex {
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "F")]
    Female,
    #[default]
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Language {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iso: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub abbreviation: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Individual {
    pub id: String,
    #[serde(default)]
    pub is_ego: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maiden_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub famc: Option<String>,
    #[serde(default)]
    pub fams: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_of_children: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_of_marriages: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth: Option<Event>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub death: Option<Event>,
    #[serde(default)]
    pub sex: Sex,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub languages: Vec<Language>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ethnicity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tribe: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<Image>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<Event>,
    #[serde(default)]
    pub hide_languages: bool,
    #[serde(default)]
    pub hide_ethnicity: bool,
    #[serde(default)]
    pub hide_id: bool,
    #[serde(default)]
    pub hide_sex: bool,
}

impl Individual {
    pub fn first_name(&self) -> Option<&str> {
        self.first_name.as_deref().filter(|name| !name.is_empty())
    }

    /// Last names are displayed upper-cased.
    pub fn last_name(&self) -> Option<String> {
        self.last_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .map(str::to_uppercase)
    }

    pub fn full_name(&self) -> String {
        let first = self.first_name().unwrap_or_default();
        let last = self.last_name().unwrap_or_default();
        format!("{first} {last}")
    }

    pub fn image_url(&self) -> Option<&str> {
        self.images
            .first()
            .map(|image| image.url.as_str())
            .filter(|url| !url.is_empty())
    }

    pub fn languages_label(&self) -> Option<String> {
        if self.languages.is_empty() {
            return None;
        }
        let labels: Vec<&str> = self
            .languages
            .iter()
            .map(|lang| lang.abbreviation.as_deref().unwrap_or(lang.name.as_str()))
            .collect();
        Some(labels.join(", "))
    }

    pub fn is_confirmed_death(&self) -> bool {
        self.death.as_ref().is_some_and(|death| death.confirmed)
    }

    pub fn show_id(&self) -> bool {
        !self.hide_id
    }

    pub fn show_sex(&self) -> bool {
        !self.hide_sex
    }

    pub fn show_languages(&self) -> bool {
        !self.hide_languages && !self.languages.is_empty()
    }

    pub fn show_ethnicity(&self) -> bool {
        !self.hide_ethnicity && self.ethnicity.is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Family {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub husb: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wife: Option<String>,
    #[serde(default)]
    pub children: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marriage: Option<Event>,
}

impl Family {
    pub fn father(&self) -> Option<&str> {
        self.husb.as_deref()
    }

    pub fn mother(&self) -> Option<&str> {
        self.wife.as_deref()
    }

    pub fn has_parents(&self) -> bool {
        self.husb.is_some() || self.wife.is_some()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JsonGedcomData {
    #[serde(default)]
    pub indis: Vec<Individual>,
    #[serde(default)]
    pub fams: Vec<Family>,
}

/// Per-render suppression flags applied to every individual.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DisplayFlags {
    pub hide_ids: bool,
    pub hide_sex: bool,
    pub hide_languages: bool,
    pub hide_ethnicity: bool,
}

/// Read-only lookup of records by id.
pub trait DataProvider {
    fn indi(&self, id: &str) -> Option<&Individual>;
    fn fam(&self, id: &str) -> Option<&Family>;
    fn indis(&self) -> Box<dyn Iterator<Item = &Individual> + '_>;
    fn fams(&self) -> Box<dyn Iterator<Item = &Family> + '_>;
}

#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    indis: Vec<Individual>,
    fams: Vec<Family>,
    indi_index: HashMap<String, usize>,
    fam_index: HashMap<String, usize>,
}

impl RecordStore {
    pub fn new(data: JsonGedcomData) -> Self {
        let mut store = Self::default();
        for mut indi in data.indis {
            normalize_indi(&mut indi);
            if let Some(&idx) = store.indi_index.get(&indi.id) {
                tracing::warn!(id = %indi.id, "duplicate individual id, keeping last");
                store.indis[idx] = indi;
            } else {
                store.indi_index.insert(indi.id.clone(), store.indis.len());
                store.indis.push(indi);
            }
        }
        for mut fam in data.fams {
            normalize_fam(&mut fam);
            if let Some(&idx) = store.fam_index.get(&fam.id) {
                tracing::warn!(id = %fam.id, "duplicate family id, keeping last");
                store.fams[idx] = fam;
            } else {
                store.fam_index.insert(fam.id.clone(), store.fams.len());
                store.fams.push(fam);
            }
        }
        tracing::debug!(
            indis = store.indis.len(),
            fams = store.fams.len(),
            "record store loaded"
        );
        store
    }

    pub fn from_json(input: &str) -> Result<Self, DataError> {
        let data: JsonGedcomData = serde_json::from_str(input)?;
        Ok(Self::new(data))
    }

    pub fn from_path(path: &Path) -> Result<Self, DataError> {
        let contents = std::fs::read_to_string(path).map_err(|source| DataError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&contents)
    }

    pub fn is_empty(&self) -> bool {
        self.indis.is_empty()
    }

    pub fn first_indi(&self) -> Option<&Individual> {
        self.indis.first()
    }

    pub fn to_json_data(&self) -> JsonGedcomData {
        JsonGedcomData {
            indis: self.indis.clone(),
            fams: self.fams.clone(),
        }
    }

    /// Sorts children by birth date and spousal families by marriage date.
    /// Undated entries go last; ties fall back to the id.
    pub fn normalize(&mut self) {
        let birth_keys: HashMap<String, Option<(i32, u32, u32)>> = self
            .indis
            .iter()
            .map(|indi| (indi.id.clone(), indi.birth.as_ref().and_then(Event::sort_key)))
            .collect();
        let marriage_keys: HashMap<String, Option<(i32, u32, u32)>> = self
            .fams
            .iter()
            .map(|fam| (fam.id.clone(), fam.marriage.as_ref().and_then(Event::sort_key)))
            .collect();

        for fam in &mut self.fams {
            fam.children.sort_by(|a, b| {
                compare_keys(birth_keys.get(a).copied().flatten(), birth_keys.get(b).copied().flatten())
                    .then_with(|| a.cmp(b))
            });
        }
        for indi in &mut self.indis {
            indi.fams.sort_by(|a, b| {
                compare_keys(
                    marriage_keys.get(a).copied().flatten(),
                    marriage_keys.get(b).copied().flatten(),
                )
                .then_with(|| a.cmp(b))
            });
        }
    }

    pub fn apply_display_flags(&mut self, flags: DisplayFlags) {
        for indi in &mut self.indis {
            indi.hide_id = flags.hide_ids;
            indi.hide_sex = flags.hide_sex;
            indi.hide_languages = flags.hide_languages;
            indi.hide_ethnicity = flags.hide_ethnicity;
        }
    }
}

impl DataProvider for RecordStore {
    fn indi(&self, id: &str) -> Option<&Individual> {
        self.indi_index.get(id).map(|&idx| &self.indis[idx])
    }

    fn fam(&self, id: &str) -> Option<&Family> {
        self.fam_index.get(id).map(|&idx| &self.fams[idx])
    }

    fn indis(&self) -> Box<dyn Iterator<Item = &Individual> + '_> {
        Box::new(self.indis.iter())
    }

    fn fams(&self) -> Box<dyn Iterator<Item = &Family> + '_> {
        Box::new(self.fams.iter())
    }
}

fn compare_keys(a: Option<(i32, u32, u32)>, b: Option<(i32, u32, u32)>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn normalize_indi(indi: &mut Individual) {
    strip_pointer(&mut indi.id);
    if let Some(famc) = indi.famc.as_mut() {
        strip_pointer(famc);
    }
    indi.fams.iter_mut().for_each(strip_pointer);
    for event in indi
        .birth
        .iter_mut()
        .chain(indi.death.iter_mut())
        .chain(indi.events.iter_mut())
    {
        resolve_gedcom_date(event);
    }
}

fn normalize_fam(fam: &mut Family) {
    strip_pointer(&mut fam.id);
    if let Some(husb) = fam.husb.as_mut() {
        strip_pointer(husb);
    }
    if let Some(wife) = fam.wife.as_mut() {
        strip_pointer(wife);
    }
    fam.children.iter_mut().for_each(strip_pointer);
    if let Some(marriage) = fam.marriage.as_mut() {
        resolve_gedcom_date(marriage);
    }
}

fn strip_pointer(id: &mut String) {
    let stripped = POINTER_RE.captures(id).map(|caps| caps[1].to_string());
    if let Some(stripped) = stripped {
        *id = stripped;
    }
}

fn resolve_gedcom_date(event: &mut Event) {
    if event.has_date() {
        return;
    }
    let Some(raw) = event.gedcom_date.as_deref() else {
        return;
    };
    if let Some((date, range)) = parse_gedcom_date(raw) {
        event.date = date;
        event.date_range = range;
    }
}

/// Parses a GEDCOM date value such as `ABT 12 MAR 1900`, `BET 1900 AND 1910`
/// or `BEF 1900`. Unparseable dates are returned verbatim in `text`.
pub fn parse_gedcom_date(raw: &str) -> Option<(Option<Date>, Option<DateRange>)> {
    let cleaned = CALENDAR_ESCAPE_RE.replace_all(raw, "");
    let parts: Vec<&str> = cleaned.split_whitespace().collect();
    let first = parts.first()?.to_lowercase();
    if first.starts_with("bet") {
        let and = parts
            .iter()
            .position(|part| part.eq_ignore_ascii_case("and"))
            .unwrap_or(parts.len());
        let from = parse_date_parts(&parts[1..and]);
        let to = parts.get(and + 1..).and_then(parse_date_parts);
        return Some((None, Some(DateRange { from, to })));
    }
    if first.starts_with("bef") {
        let to = parse_date_parts(&parts[1..]);
        return Some((None, Some(DateRange { from: None, to })));
    }
    if first.starts_with("aft") {
        let from = parse_date_parts(&parts[1..]);
        return Some((None, Some(DateRange { from, to: None })));
    }
    parse_date_parts(&parts).map(|date| (Some(date), None))
}

fn parse_date_parts(parts: &[&str]) -> Option<Date> {
    if parts.is_empty() {
        return None;
    }
    let full_text = parts.join(" ");
    let trimmed = full_text.trim_start_matches('(').trim_end_matches(')');
    let mut rest: Vec<&str> = trimmed.split_whitespace().collect();
    let mut date = Date::default();

    if let Some(first) = rest.first() {
        let lower = first.to_lowercase();
        if matches!(lower.as_str(), "cal" | "abt" | "est") {
            date.qualifier = Some(lower);
            rest.remove(0);
        }
    }
    if let Some(last) = rest.last()
        && YEAR_RE.is_match(last)
    {
        date.year = last.parse().ok();
        rest.pop();
    }
    if let Some(last) = rest.last() {
        let lower = last.to_lowercase();
        if let Some(idx) = MONTHS.iter().position(|month| *month == lower) {
            date.month = Some(idx as u32 + 1);
            rest.pop();
        }
    }
    if let Some(first) = rest.first()
        && DAY_RE.is_match(first)
    {
        date.day = first.parse().ok();
        rest.remove(0);
    }
    if !rest.is_empty() {
        return Some(Date {
            text: Some(trimmed.to_string()),
            ..Default::default()
        });
    }
    Some(date)
}

pub fn format_date(date: &Date) -> String {
    if let Some(text) = &date.text {
        return text.clone();
    }
    let mut parts: Vec<String> = Vec::new();
    if let Some(qualifier) = &date.qualifier {
        parts.push(qualifier.clone());
    }
    if let Some(day) = date.day {
        parts.push(day.to_string());
    }
    if let Some(month) = date.month
        && (1..=12).contains(&month)
    {
        parts.push(MONTH_LABELS[month as usize - 1].to_string());
    }
    if let Some(year) = date.year {
        parts.push(year.to_string());
    }
    parts.join(" ")
}

/// English-only label for the date part of an event.
pub fn format_event_date(event: &Event) -> Option<String> {
    if let Some(date) = &event.date {
        let text = format_date(date);
        return (!text.is_empty()).then_some(text);
    }
    let range = event.date_range.as_ref()?;
    let text = match (&range.from, &range.to) {
        (Some(from), Some(to)) => format!("between {} and {}", format_date(from), format_date(to)),
        (Some(from), None) => format!("after {}", format_date(from)),
        (None, Some(to)) => format!("before {}", format_date(to)),
        (None, None) => return None,
    };
    Some(text)
}
