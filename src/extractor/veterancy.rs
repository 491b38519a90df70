// SPDX-License-Identifier: GPL-3.0-only
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::downloader::HttpClient;
use crate::extractor::traits::{DataExtractor, ExtractionRequest, ExtractionResult, Metadata};

const OUTPUT_FILE_NAME: &str = "veterancy.json";

// The guide heading writes its last-updated date as M-D-YY
const GUIDE_DATE_FORMAT: &str = "%m-%d-%y";
const VERSION_DATE_FORMAT: &str = "%d-%m-%Y";

pub const VETERANCY_TIERS: usize = 3;

static SECTION_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".guide > .content .section").expect("valid section selector"));

static INTRO_HEADING_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("h3").expect("valid heading selector"));

static UNIT_TABLE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".post_content_table").expect("valid table selector"));

static ROW_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("tr").expect("valid row selector"));

static CELL_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("td").expect("valid cell selector"));

static DATE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+-\d+-\d+").expect("valid date regex"));

/// One slot per veterancy tier; a tier the page doesn't list stays unset.
pub type UnitVeterancy = [Option<String>; VETERANCY_TIERS];
pub type ArmyUnits = IndexMap<String, UnitVeterancy>;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VeterancyData {
    #[serde(with = "version_date")]
    pub last_updated: NaiveDate,
    pub data: IndexMap<String, ArmyUnits>,
}

mod version_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer, de};

    const FORMAT: &str = "%d-%m-%Y";

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&date.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let value = String::deserialize(deserializer)?;
        NaiveDate::parse_from_str(&value, FORMAT).map_err(de::Error::custom)
    }
}

#[derive(thiserror::Error, Debug)]
pub enum VeterancyParseError {
    #[error("could not parse last updated date from page")]
    MissingDate,

    #[error("could not parse date: {value}")]
    InvalidDate {
        value: String,
        #[source]
        source: chrono::ParseError,
    },
}

/// Parse the guide page into per-army unit veterancy tables.
///
/// The page carries no schema: an `.h1`-headed section starts an army, the
/// sections after it hold that army's unit tables, and a table's position
/// within its section is the veterancy tier it describes. The section headed
/// `RIP` ends the useful content.
pub fn parse_guide(html: &str) -> Result<VeterancyData, VeterancyParseError> {
    let document = Html::parse_document(html);
    let sections: Vec<ElementRef> = document.select(&SECTION_SELECTOR).collect();

    let intro_heading = sections
        .first()
        .map(|section| {
            section
                .select(&INTRO_HEADING_SELECTOR)
                .flat_map(|heading| heading.text())
                .collect::<String>()
        })
        .unwrap_or_default();

    let date_match = DATE_RE
        .find(&intro_heading)
        .ok_or(VeterancyParseError::MissingDate)?;
    let last_updated = NaiveDate::parse_from_str(date_match.as_str(), GUIDE_DATE_FORMAT).map_err(
        |source| VeterancyParseError::InvalidDate {
            value: date_match.as_str().to_string(),
            source,
        },
    )?;

    let mut data: IndexMap<String, ArmyUnits> = IndexMap::new();
    let mut current_army: Option<String> = None;

    for section in sections.iter().skip(1) {
        let first_child = section.children().filter_map(ElementRef::wrap).next();

        // A section opening with an `.h1` heading starts a new army
        if let Some(heading) = first_child.filter(|el| el.value().classes().any(|c| c == "h1")) {
            let name = heading.text().collect::<String>().trim().to_string();

            // Everything from the 'RIP' section on is no longer unit data
            if name == "RIP" {
                break;
            }

            debug!(army = %name, "Parsing army");
            data.insert(name.clone(), ArmyUnits::new());
            current_army = Some(name);
            continue;
        }

        let Some(units) = current_army.as_ref().and_then(|name| data.get_mut(name)) else {
            continue;
        };

        // Table position within the section is the veterancy tier; the page
        // never labels tiers, so this ordering is the only signal
        for (tier, table) in section.select(&UNIT_TABLE_SELECTOR).enumerate() {
            let mut rows = table.select(&ROW_SELECTOR);

            let unit_name = rows
                .next()
                .and_then(|row| row.select(&CELL_SELECTOR).nth(1))
                .map(|cell| cell.text().collect::<String>())
                .unwrap_or_default();
            debug!(unit = %unit_name, tier, "Parsing unit table");

            // A table always starts its unit from unset slots
            let slots = units.entry(unit_name).or_default();
            *slots = UnitVeterancy::default();

            for row in rows {
                if let Some(cell) = row.select(&CELL_SELECTOR).nth(1) {
                    if let Some(slot) = slots.get_mut(tier) {
                        *slot = Some(cell.text().collect::<String>());
                    }
                }
            }
        }
    }

    Ok(VeterancyData { last_updated, data })
}

/// Scrapes the coh2.org veterancy guide into a dated JSON snapshot.
pub struct VeterancyExtractor {
    http: HttpClient,
    guide_url: String,
}

impl VeterancyExtractor {
    pub fn new(guide_url: String) -> anyhow::Result<Self> {
        Ok(Self {
            http: HttpClient::new()?,
            guide_url,
        })
    }
}

#[async_trait]
impl DataExtractor for VeterancyExtractor {
    async fn extract(&self, request: &ExtractionRequest) -> anyhow::Result<ExtractionResult> {
        info!("Downloading latest veterancy data");

        let html = self.http.get_text(&self.guide_url).await?;
        let guide = parse_guide(&html)?;

        let age_days = (Utc::now().date_naive() - guide.last_updated).num_days();
        info!(age_days, "Guide last updated");

        let version_id = guide.last_updated.format(VERSION_DATE_FORMAT).to_string();
        let version_dir = request.output_path.join(&version_id);
        let metadata = Metadata::new(version_id.clone());

        let completed = if version_dir.exists() {
            warn!(version = %version_id, "Veterancy data already downloaded");
            false
        } else {
            tokio::fs::create_dir_all(&version_dir).await?;
            let json = serde_json::to_string_pretty(&guide)?;
            tokio::fs::write(version_dir.join(OUTPUT_FILE_NAME), json).await?;
            true
        };

        Ok(ExtractionResult {
            version_id,
            metadata,
            final_output_path: version_dir,
            completed,
        })
    }
}
