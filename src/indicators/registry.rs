//! Indicator catalog and per-indicator source preferences.

use std::path::PathBuf;

use crate::config::SourceEndpoints;
use crate::models::IndicatorDefinition;
use crate::services::csv::CsvFormat;

pub const OWID_LABEL: &str = "OWID";
pub const LOCAL_CSV_LABEL: &str = "LOCAL_CSV";

/// Which upstream dataset a remote CSV source reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OwidDataset {
    Co2,
    Energy,
}

/// One entry in an indicator's fallback order.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceSpec {
    WorldBank { series: String },
    RemoteCsv { label: String, url: String, format: CsvFormat },
    LocalCsv { label: String, path: PathBuf, format: CsvFormat },
}

impl SourceSpec {
    pub fn label(&self) -> &str {
        match self {
            SourceSpec::WorldBank { .. } => crate::services::world_bank::WORLD_BANK_LABEL,
            SourceSpec::RemoteCsv { label, .. } | SourceSpec::LocalCsv { label, .. } => label,
        }
    }
}

/// A raw (ingested) indicator and where to look for it, most preferred first.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSpec {
    pub definition: IndicatorDefinition,
    pub sources: Vec<SourceSpec>,
}

struct Builder<'a> {
    endpoints: &'a SourceEndpoints,
    definition: IndicatorDefinition,
    sources: Vec<SourceSpec>,
}

impl<'a> Builder<'a> {
    fn new(endpoints: &'a SourceEndpoints, definition: IndicatorDefinition) -> Self {
        Self {
            endpoints,
            definition,
            sources: Vec::new(),
        }
    }

    fn world_bank(mut self, series: &str) -> Self {
        self.sources.push(SourceSpec::WorldBank {
            series: series.to_string(),
        });
        self
    }

    fn owid(mut self, dataset: OwidDataset, column: &str) -> Self {
        let url = match dataset {
            OwidDataset::Co2 => &self.endpoints.owid_co2_url,
            OwidDataset::Energy => &self.endpoints.owid_energy_url,
        };
        self.sources.push(SourceSpec::RemoteCsv {
            label: OWID_LABEL.to_string(),
            url: url.clone(),
            format: CsvFormat::owid(column),
        });
        self
    }

    /// World Bank bulk download: four preamble lines, then one column per year.
    fn local_world_bank_export(mut self, series: &str) -> Self {
        self.sources.push(SourceSpec::LocalCsv {
            label: LOCAL_CSV_LABEL.to_string(),
            path: self.endpoints.local_data_dir.join(format!("API_{}.csv", series)),
            format: CsvFormat::wide("Country Code").with_skip_lines(4),
        });
        self
    }

    fn local_long(mut self) -> Self {
        self.sources.push(SourceSpec::LocalCsv {
            label: LOCAL_CSV_LABEL.to_string(),
            path: self
                .endpoints
                .local_data_dir
                .join(format!("{}.csv", self.definition.code)),
            format: CsvFormat::long("Country Code", "Year", "Value"),
        });
        self
    }

    fn build(self) -> IndicatorSpec {
        IndicatorSpec {
            definition: self.definition,
            sources: self.sources,
        }
    }
}

/// The raw indicators ingested by the pipeline.
pub fn default_catalog(endpoints: &SourceEndpoints) -> Vec<IndicatorSpec> {
    let def = IndicatorDefinition::new;
    let b = |d| Builder::new(endpoints, d);

    vec![
        b(def("emissions.co2_per_capita", "CO2 emissions per capita", "t CO2/person", "OWID / World Bank", "emissions"))
            .owid(OwidDataset::Co2, "co2_per_capita")
            .world_bank("EN.GHG.CO2.PC.CE.AR5")
            .local_world_bank_export("EN.GHG.CO2.PC.CE.AR5")
            .build(),
        b(def("emissions.co2_total", "CO2 emissions", "Mt CO2", "OWID / World Bank", "emissions"))
            .owid(OwidDataset::Co2, "co2")
            .world_bank("EN.GHG.CO2.MT.CE.AR5")
            .local_world_bank_export("EN.GHG.CO2.MT.CE.AR5")
            .build(),
        b(def("emissions.ghg_per_capita", "Greenhouse gas emissions per capita", "t CO2e/person", "OWID / World Bank", "emissions"))
            .owid(OwidDataset::Co2, "ghg_per_capita")
            .world_bank("EN.GHG.ALL.PC.CE.AR5")
            .local_world_bank_export("EN.GHG.ALL.PC.CE.AR5")
            .build(),
        b(def("energy.renewable_share", "Renewable energy share", "% of final energy", "World Bank / OWID", "energy"))
            .world_bank("EG.FEC.RNEW.ZS")
            .owid(OwidDataset::Energy, "renewables_share_energy")
            .local_world_bank_export("EG.FEC.RNEW.ZS")
            .build(),
        b(def("energy.fossil_share", "Fossil fuel energy share", "% of energy use", "World Bank / OWID", "energy"))
            .world_bank("EG.USE.COMM.FO.ZS")
            .owid(OwidDataset::Energy, "fossil_share_energy")
            .local_world_bank_export("EG.USE.COMM.FO.ZS")
            .build(),
        b(def("energy.primary_energy", "Primary energy consumption", "TWh", "OWID", "energy"))
            .owid(OwidDataset::Energy, "primary_energy_consumption")
            .local_long()
            .build(),
        b(def("energy.electricity_access", "Access to electricity", "% of population", "World Bank", "energy"))
            .world_bank("EG.ELC.ACCS.ZS")
            .local_world_bank_export("EG.ELC.ACCS.ZS")
            .build(),
        b(def("economy.gdp_total", "GDP", "constant 2015 USD", "World Bank", "economy"))
            .world_bank("NY.GDP.MKTP.KD")
            .local_world_bank_export("NY.GDP.MKTP.KD")
            .build(),
        b(def("economy.gdp_per_capita", "GDP per capita", "constant 2015 USD", "World Bank", "economy"))
            .world_bank("NY.GDP.PCAP.KD")
            .local_world_bank_export("NY.GDP.PCAP.KD")
            .build(),
        b(def("nature.forest_area", "Forest area", "% of land area", "World Bank", "nature"))
            .world_bank("AG.LND.FRST.ZS")
            .local_world_bank_export("AG.LND.FRST.ZS")
            .build(),
        b(def("nature.protected_areas", "Terrestrial and marine protected areas", "% of territory", "World Bank", "nature"))
            .world_bank("ER.PTD.TOTL.ZS")
            .local_world_bank_export("ER.PTD.TOTL.ZS")
            .build(),
        b(def("health.pm25_exposure", "PM2.5 mean annual exposure", "µg/m³", "World Bank", "health"))
            .world_bank("EN.ATM.PM25.MC.M3")
            .local_world_bank_export("EN.ATM.PM25.MC.M3")
            .build(),
        b(def("health.life_expectancy", "Life expectancy at birth", "years", "World Bank", "health"))
            .world_bank("SP.DYN.LE00.IN")
            .local_world_bank_export("SP.DYN.LE00.IN")
            .build(),
    ]
}

/// Keep only specs whose code is in `codes`; an empty filter keeps everything.
pub fn filter_catalog(catalog: Vec<IndicatorSpec>, codes: &[String]) -> Vec<IndicatorSpec> {
    if codes.is_empty() {
        return catalog;
    }
    catalog
        .into_iter()
        .filter(|spec| codes.iter().any(|c| c == &spec.definition.code))
        .collect()
}
