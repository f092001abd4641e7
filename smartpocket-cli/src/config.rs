use anyhow::{Context, Result, anyhow};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use smartpocket_finance::{CategoryRule, CategoryTable, ResolverMarkers, ResolverRules, StatementPipeline};
use smartpocket_ingest::{AmountLayout, FormatSpec, formats::NAMED_MONTH_COLUMNS};
use std::fs;
use std::path::{Path, PathBuf};

use crate::state::ensure_smartpocket_home;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub storage: StorageSection,
    pub statement: StatementSection,
    pub display: DisplaySection,
    pub resolver: ResolverMarkers,
    /// Custom record grammars, checked before the built-ins
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub formats: Vec<FormatSection>,
    /// Ordered category table; empty means the built-in table
    pub categories: Vec<CategoryRule>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSection {
    /// JSON record file (default: ~/.smartpocket/records.json)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub records_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StatementSection {
    /// Format used when `--format` is not given
    pub format: String,
    /// Year for formats whose dates carry none
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year_hint: Option<i32>,
    pub default_category: String,
}

impl Default for StatementSection {
    fn default() -> Self {
        Self {
            format: NAMED_MONTH_COLUMNS.to_string(),
            year_hint: None,
            default_category: smartpocket_finance::DEFAULT_CATEGORY.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySection {
    /// IANA timezone for upload timestamps
    pub timezone: String,
}

impl Default for DisplaySection {
    fn default() -> Self {
        Self {
            timezone: "UTC".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormatSection {
    pub name: String,
    pub pattern: String,
    pub layout: AmountLayout,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage: StorageSection::default(),
            statement: StatementSection::default(),
            display: DisplaySection::default(),
            resolver: ResolverMarkers::default(),
            formats: Vec::new(),
            // Written out in full so init-config gives an editable table.
            categories: CategoryTable::default().rules().to_vec(),
        }
    }
}

impl Config {
    /// Resolve a format by name: custom `[[formats]]` first, then built-ins.
    pub fn format_spec(&self, name: Option<&str>) -> Result<FormatSpec> {
        let name = name.unwrap_or(&self.statement.format);
        let spec = match self.formats.iter().find(|f| f.name == name) {
            Some(f) => FormatSpec::new(&f.name, &f.pattern, f.layout)?,
            None => FormatSpec::builtin(name)?,
        };
        Ok(spec)
    }

    pub fn category_table(&self) -> CategoryTable {
        if self.categories.is_empty() {
            return CategoryTable::new(
                CategoryTable::default().rules().to_vec(),
                &self.statement.default_category,
            );
        }
        CategoryTable::new(self.categories.clone(), &self.statement.default_category)
    }

    pub fn pipeline(&self, format: Option<&str>) -> Result<StatementPipeline> {
        Ok(StatementPipeline::new(
            self.format_spec(format)?,
            ResolverRules::from_markers(&self.resolver),
            self.category_table(),
        ))
    }

    pub fn timezone(&self) -> Result<Tz> {
        let tz = &self.display.timezone;
        tz.parse().map_err(|_| anyhow!("invalid timezone: {tz}"))
    }

    pub fn records_path(&self) -> Result<PathBuf> {
        match &self.storage.records_file {
            Some(p) => Ok(p.clone()),
            None => Ok(ensure_smartpocket_home()?.join("records.json")),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_smartpocket_home()?.join("config.toml"))
}

pub fn load_config() -> Result<Config> {
    load_config_from(&config_path()?)
}

pub fn load_config_from(p: &Path) -> Result<Config> {
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(p).with_context(|| format!("read {}", p.display()))?;
    toml::from_str(&s).with_context(|| format!("parse {}", p.display()))
}

pub fn save_config_to(cfg: &Config, p: &Path) -> Result<()> {
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    save_config_to(&Config::default(), &p)?;
    println!("Wrote {}", p.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use smartpocket_ingest::formats::SIGNED_DAY_MONTH;

    #[test]
    fn test_default_round_trips_through_toml() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("config.toml");
        save_config_to(&Config::default(), &p).unwrap();

        let cfg = load_config_from(&p).unwrap();
        assert_eq!(cfg.statement.format, NAMED_MONTH_COLUMNS);
        assert_eq!(cfg.resolver, ResolverMarkers::default());
        assert_eq!(cfg.category_table(), CategoryTable::default());
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config_from(&dir.path().join("nope.toml")).unwrap();
        assert!(cfg.formats.is_empty());
        assert_eq!(cfg.statement.default_category, "Other");
    }

    #[test]
    fn test_partial_config() {
        let cfg: Config = toml::from_str(
            r#"
[statement]
format = "signed_day_month"
year_hint = 2024

[resolver]
internal_transfer = ["vault"]

[[categories]]
name = "Pets"
keywords = ["PetStop"]
"#,
        )
        .unwrap();

        assert_eq!(cfg.statement.year_hint, Some(2024));
        assert_eq!(cfg.timezone().unwrap(), chrono_tz::UTC);
        assert_eq!(cfg.statement.default_category, "Other");
        assert_eq!(cfg.resolver.internal_transfer, vec!["vault".to_string()]);
        assert_eq!(cfg.resolver.top_up, ResolverMarkers::default().top_up);

        let table = cfg.category_table();
        assert_eq!(table.categorize("PETSTOP NAAS"), "Pets");
        assert_eq!(table.categorize("Tesco"), "Other");

        let pipeline = cfg.pipeline(None).unwrap();
        assert_eq!(pipeline.format().name(), SIGNED_DAY_MONTH);
    }

    #[test]
    fn test_custom_format_by_name() {
        let cfg: Config = toml::from_str(
            r#"
[[formats]]
name = "csv_like"
pattern = '(?m)^(?P<date>\d{2}/\d{2}/\d{4}),(?P<desc>[^,]+),(?P<amount>-?\d+\.\d{2})$'
layout = "signed"
"#,
        )
        .unwrap();

        let spec = cfg.format_spec(Some("csv_like")).unwrap();
        assert_eq!(spec.layout(), AmountLayout::Signed);

        let out = cfg
            .pipeline(Some("csv_like"))
            .unwrap()
            .process("03/01/2025,Tesco,-4.50", None)
            .unwrap();
        assert_eq!(
            out.summary.category_totals["Groceries"],
            "4.50".parse::<rust_decimal::Decimal>().unwrap()
        );

        assert!(cfg.format_spec(Some("unknown")).is_err());
    }

    #[test]
    fn test_custom_format_shadows_builtin() {
        let cfg: Config = toml::from_str(
            r#"
[[formats]]
name = "named_month_columns"
pattern = '(?m)^(?P<date>\d{2}/\d{2}/\d{4});(?P<desc>[^;]+);(?P<amount>-?\d+\.\d{2})$'
layout = "signed"
"#,
        )
        .unwrap();

        // The default format name now resolves to the custom grammar.
        let spec = cfg.format_spec(None).unwrap();
        assert_eq!(spec.name(), NAMED_MONTH_COLUMNS);
        assert_eq!(spec.layout(), AmountLayout::Signed);

        let out = cfg
            .pipeline(None)
            .unwrap()
            .process("03/01/2025;Tesco;-4.50", None)
            .unwrap();
        assert_eq!(out.statement_month.to_string(), "2025-01");
        assert_eq!(out.transactions.len(), 1);
        assert!(
            cfg.pipeline(None)
                .unwrap()
                .process("03 Jan 2025 Tesco 4.50 0.00", None)
                .is_err()
        );
    }

    #[test]
    fn test_timezone() {
        let cfg: Config = toml::from_str("[display]\ntimezone = \"Europe/Dublin\"\n").unwrap();
        assert_eq!(cfg.timezone().unwrap(), chrono_tz::Europe::Dublin);

        let cfg: Config = toml::from_str("[display]\ntimezone = \"Mars/Olympus\"\n").unwrap();
        assert!(cfg.timezone().is_err());
    }

    #[test]
    fn test_bad_custom_format_rejected() {
        let cfg: Config = toml::from_str(
            r#"
[[formats]]
name = "broken"
pattern = '(?P<date>\S+) (?P<desc>.+)'
layout = "debit_credit"
"#,
        )
        .unwrap();
        let err = cfg.format_spec(Some("broken")).unwrap_err();
        assert!(err.to_string().contains("broken"));
    }
}
