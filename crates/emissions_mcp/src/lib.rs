use std::path::PathBuf;
use std::sync::Arc;

use rmcp::Json;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    GetPromptRequestParams, GetPromptResult, ListPromptsResult, PaginatedRequestParams,
};
use rmcp::service::RequestContext;
use rmcp::RoleServer;
use rmcp::{prompt, prompt_handler, prompt_router, tool, tool_handler, tool_router};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use emissions_core::aggregate::{round2, top_n};
use emissions_core::artifacts::{JsonReportWriter, ReportDataset, ReportSink, report_stamp};
use emissions_core::config::Config;
use emissions_core::csv_store::CsvEmissionsStore;
use emissions_core::observability::Health;
use emissions_core::report::{format_company_listing, format_record, summarize};
use emissions_core::{Category, EmissionRecord, EmissionsError, EmissionsStore, Submission};

pub mod error;
mod prompts;

pub use error::{McpError, McpResult};

/// Per-target overrides appended to every filter to keep rmcp internals quiet.
pub const QUIET_TARGETS: &str = "rmcp=warn,serve_inner=warn";

/// Log level from `EMISSIONS_LOG_LEVEL`, then `RUST_LOG`, then `info`.
pub fn log_level_from_env() -> String {
    log_level(
        std::env::var("EMISSIONS_LOG_LEVEL").ok(),
        std::env::var("RUST_LOG").ok(),
    )
}

pub fn log_level(emissions_level: Option<String>, rust_log: Option<String>) -> String {
    let set = |v: &String| !v.trim().is_empty();
    emissions_level
        .filter(set)
        .or(rust_log.filter(set))
        .unwrap_or_else(|| "info".to_string())
}

/// Builds the subscriber filter for `level`. An unparsable level falls back
/// to `info`.
pub fn log_filter(level: &str) -> tracing_subscriber::EnvFilter {
    tracing_subscriber::EnvFilter::try_new(format!("{level},{QUIET_TARGETS}"))
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(format!("info,{QUIET_TARGETS}")))
}

#[derive(Clone)]
pub struct EmissionsMcpHandler {
    store: Arc<dyn EmissionsStore>,
    sink: Arc<dyn ReportSink>,
    reports_dir: PathBuf,
    top_n: usize,
    tool_router: rmcp::handler::server::tool::ToolRouter<EmissionsMcpHandler>,
    prompt_router: rmcp::handler::server::router::prompt::PromptRouter<EmissionsMcpHandler>,
}

/// Raw form input for a new company. Values are monthly quantities as typed;
/// Bicycle and Walking may be omitted.
#[derive(Debug, Default, Deserialize, Serialize, JsonSchema)]
pub struct AddEmissionsParams {
    /// Exactly four digits, unique
    pub id: String,
    pub name: String,
    pub car: Option<String>,
    pub bus: Option<String>,
    pub train: Option<String>,
    pub bicycle: Option<String>,
    pub walking: Option<String>,
    pub electricity: Option<String>,
    pub natural_gas: Option<String>,
    pub fuel_oil: Option<String>,
    pub propane: Option<String>,
    pub coal: Option<String>,
}

impl AddEmissionsParams {
    fn into_submission(self) -> Submission {
        let mut submission = Submission::new(self.id, self.name);
        let fields = [
            (Category::Car, self.car),
            (Category::Bus, self.bus),
            (Category::Train, self.train),
            (Category::Bicycle, self.bicycle),
            (Category::Walking, self.walking),
            (Category::Electricity, self.electricity),
            (Category::NaturalGas, self.natural_gas),
            (Category::FuelOil, self.fuel_oil),
            (Category::Propane, self.propane),
            (Category::Coal, self.coal),
        ];
        for (category, raw) in fields {
            if let Some(raw) = raw {
                submission = submission.with(category, raw.trim());
            }
        }
        submission
    }
}

#[derive(Debug, Deserialize, Serialize, JsonSchema)]
pub struct CompanyIdParam {
    pub company_id: String,
}

#[derive(Debug, Deserialize, Serialize, JsonSchema)]
pub struct TopEmittersParams {
    pub limit: Option<u32>,
}

/// Stored values in kg CO2 per year.
#[derive(Debug, Serialize, JsonSchema)]
pub struct RecordResult {
    pub id: String,
    pub name: String,
    pub car: f64,
    pub bus: f64,
    pub train: f64,
    pub bicycle: f64,
    pub walking: f64,
    pub electricity: f64,
    pub natural_gas: f64,
    pub fuel_oil: f64,
    pub propane: f64,
    pub coal: f64,
}

impl From<&EmissionRecord> for RecordResult {
    fn from(r: &EmissionRecord) -> Self {
        Self {
            id: r.id.clone(),
            name: r.name.clone(),
            car: r.amount(Category::Car),
            bus: r.amount(Category::Bus),
            train: r.amount(Category::Train),
            bicycle: r.amount(Category::Bicycle),
            walking: r.amount(Category::Walking),
            electricity: r.amount(Category::Electricity),
            natural_gas: r.amount(Category::NaturalGas),
            fuel_oil: r.amount(Category::FuelOil),
            propane: r.amount(Category::Propane),
            coal: r.amount(Category::Coal),
        }
    }
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct AddEmissionsResult {
    pub record: RecordResult,
    pub report_path: Option<String>,
    pub report_error: Option<String>,
    pub message: String,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct SummaryResult {
    pub transportation: f64,
    pub energy: f64,
    pub total: f64,
    pub recommendation: String,
    pub text: String,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct GetEmissionsResult {
    pub record: RecordResult,
    pub details: String,
    pub summary: SummaryResult,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct DeleteResult {
    pub company_id: String,
    pub deleted: usize,
    pub message: String,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct CompanyEntry {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct CompanyListResult {
    pub companies: Vec<CompanyEntry>,
    pub text: String,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct RankedCompany {
    pub rank: usize,
    pub id: String,
    pub name: String,
    pub energy: f64,
    pub transportation: f64,
    pub total: f64,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct TopEmittersResult {
    pub companies: Vec<RankedCompany>,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct ReportListResult {
    pub reports: Vec<String>,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct StoreStatusResult {
    pub ready: bool,
    pub records: usize,
    pub error: Option<String>,
}

// === Prompt Parameters ===

#[derive(Debug, Deserialize, Serialize, JsonSchema)]
pub struct EmissionsReviewParams {
    pub company_id: Option<String>,
}

#[tool_router]
#[prompt_router]
impl EmissionsMcpHandler {
    pub fn new(store: Arc<dyn EmissionsStore>, sink: Arc<dyn ReportSink>, config: &Config) -> Self {
        Self {
            store,
            sink,
            reports_dir: config.reports_dir.clone(),
            top_n: config.top_n,
            tool_router: Self::tool_router(),
            prompt_router: Self::prompt_router(),
        }
    }

    /// CSV-backed store and JSON report data under the configured paths.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            Arc::new(CsvEmissionsStore::new(&config.data_file)),
            Arc::new(JsonReportWriter::new(&config.reports_dir)),
            config,
        )
    }

    pub fn tool_count(&self) -> usize {
        self.tool_router.list_all().len()
    }

    pub fn prompt_count(&self) -> usize {
        self.prompt_router.list_all().len()
    }

    /// Runs a store operation on the blocking pool.
    async fn with_store<T, F>(&self, op: F) -> McpResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&dyn EmissionsStore) -> Result<T, EmissionsError> + Send + 'static,
    {
        let store = self.store.clone();
        tokio::task::spawn_blocking(move || op(store.as_ref()))
            .await
            .map_err(|e| McpError::Internal(e.to_string()))?
            .map_err(McpError::from)
    }

    /// Regenerates report data after an insert. Failures are returned, not
    /// raised: the record is already stored.
    async fn publish_report(&self) -> Result<Option<PathBuf>, String> {
        let sink = self.sink.clone();
        let top = self.top_n;
        let stamp = report_stamp(chrono::Local::now());
        self.with_store(move |store| {
            let dataset = ReportDataset::build(&store.records()?, top, stamp);
            sink.publish(&dataset)
        })
        .await
        .map_err(|e| e.user_message())
    }

    #[tool(
        name = "add_emissions",
        description = "Validate and store a company's monthly emissions inputs"
    )]
    async fn add_emissions(
        &self,
        params: Parameters<AddEmissionsParams>,
    ) -> Result<Json<AddEmissionsResult>, String> {
        let submission = params.0.into_submission();
        let record = self
            .with_store(move |store| store.insert(&submission))
            .await?;

        let (report_path, report_error) = match self.publish_report().await {
            Ok(path) => (path.map(|p| p.display().to_string()), None),
            Err(e) => {
                tracing::warn!(error = %e, "report generation failed after insert");
                (None, Some(e))
            }
        };
        let message = if report_error.is_none() {
            "Emissions data with a report added successfully!".to_string()
        } else {
            "Emissions data added successfully, but the report could not be generated.".to_string()
        };
        Ok(Json(AddEmissionsResult {
            record: RecordResult::from(&record),
            report_path,
            report_error,
            message,
        }))
    }

    #[tool(
        name = "get_emissions",
        description = "Get a company's stored emissions with a summary and recommendation"
    )]
    async fn get_emissions(
        &self,
        params: Parameters<CompanyIdParam>,
    ) -> Result<Json<GetEmissionsResult>, String> {
        let id = params.0.company_id;
        let record = self
            .with_store(move |store| store.find_by_id(&id))
            .await?;
        let summary = summarize(&record);
        Ok(Json(GetEmissionsResult {
            record: RecordResult::from(&record),
            details: format_record(&record),
            summary: SummaryResult {
                transportation: round2(summary.transportation),
                energy: round2(summary.energy),
                total: round2(summary.total),
                recommendation: summary.recommendation.message().to_string(),
                text: summary.to_string(),
            },
        }))
    }

    #[tool(name = "delete_emissions", description = "Delete a company's emissions by id")]
    async fn delete_emissions(
        &self,
        params: Parameters<CompanyIdParam>,
    ) -> Result<Json<DeleteResult>, String> {
        let id = params.0.company_id;
        let key = id.trim().to_string();
        let deleted = self
            .with_store(move |store| store.delete_by_id(&id))
            .await?;
        Ok(Json(DeleteResult {
            message: format!(
                "Emissions data for company ID {} has been deleted successfully.",
                key
            ),
            company_id: key,
            deleted,
        }))
    }

    #[tool(
        name = "list_companies",
        description = "List all companies ordered alphabetically by name"
    )]
    async fn list_companies(&self) -> Result<Json<CompanyListResult>, String> {
        let records = self
            .with_store(|store| store.list_sorted_by_name())
            .await?;
        Ok(Json(CompanyListResult {
            text: format_company_listing(&records),
            companies: records
                .into_iter()
                .map(|r| CompanyEntry {
                    id: r.id,
                    name: r.name,
                })
                .collect(),
        }))
    }

    #[tool(
        name = "top_emitters",
        description = "Rank companies by combined energy and transportation emissions"
    )]
    async fn top_emitters(
        &self,
        params: Parameters<TopEmittersParams>,
    ) -> Result<Json<TopEmittersResult>, String> {
        let limit = params.0.limit.map(|l| l as usize).unwrap_or(self.top_n);
        let ranked = self
            .with_store(move |store| Ok(top_n(&store.records()?, limit)))
            .await?;
        let companies = ranked
            .into_iter()
            .enumerate()
            .map(|(i, t)| RankedCompany {
                rank: i + 1,
                energy: round2(t.energy),
                transportation: round2(t.transportation),
                total: round2(t.total()),
                id: t.id,
                name: t.name,
            })
            .collect();
        Ok(Json(TopEmittersResult { companies }))
    }

    #[tool(name = "list_reports", description = "List generated reports, newest first")]
    async fn list_reports(&self) -> Result<Json<ReportListResult>, String> {
        let dir = self.reports_dir.clone();
        let reports = tokio::task::spawn_blocking(move || emissions_core::artifacts::list_reports(&dir))
            .await
            .map_err(|e| McpError::Internal(e.to_string()))?
            .map_err(McpError::from)?;
        Ok(Json(ReportListResult {
            reports: reports.into_iter().map(|r| r.file_name).collect(),
        }))
    }

    #[tool(name = "store_status", description = "Check that the emissions data file is readable")]
    async fn store_status(&self) -> Result<Json<StoreStatusResult>, String> {
        let health = self
            .with_store(|store| Ok(Health::probe(store)))
            .await?;
        Ok(Json(StoreStatusResult {
            ready: health.ready,
            records: health.records,
            error: health.error,
        }))
    }

    // === Prompts ===

    /// Emissions review for one company, or an overview of the top emitters
    #[prompt(
        name = "emissions-review",
        description = "Review a company's emissions or the dataset's top emitters"
    )]
    async fn emissions_review(&self, params: Parameters<EmissionsReviewParams>) -> GetPromptResult {
        prompts::emissions_review_prompt(params.0.company_id.as_deref(), self.top_n)
    }
}

#[tool_handler]
#[prompt_handler(router = self.prompt_router)]
impl rmcp::ServerHandler for EmissionsMcpHandler {
    fn get_info(&self) -> rmcp::model::ServerInfo {
        rmcp::model::ServerInfo::new(
            rmcp::model::ServerCapabilities::builder()
                .enable_tools()
                .enable_prompts()
                .build(),
        )
        .with_instructions(
            "Company carbon emissions registry - add, retrieve, delete and rank \
             per-company emissions records and list generated reports.",
        )
    }
}
