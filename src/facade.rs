//! `Engine`: wires C1–C10 together per the control-flow diagram in spec §2.
//! The host owns configuration, storage persistence, and the chat platform
//! itself; this type only sequences calls across the workspace's crates.

use async_trait::async_trait;

use ib_core::{
    CoreResult, CurrentData, ExtensionConfig, HostContext, MissingFieldReport, Panel, StatusReport, UpdateStrategy,
};
use ib_panels::DataStore;
use ib_parser::{DataUpdater, MemorySummaryEntry, ParsedBlock, ResponseParser};
use ib_prompt::{compose, resolve_api_target, ApiTarget, ComposeOptions, InjectionDispatcher, OutputMode, RuleCatalog, RuleProvider};
use ib_retrieval::ContextualRetrieval;

/// External sink for `<ai_memory_summary>` entries. Memories themselves are
/// owned by an external deep-memory collaborator (spec §3); this facade
/// only hands parsed entries off to whoever owns that store, it never
/// writes memories itself. `ib-retrieval` stays a read-only collaborator
/// of that store (its `MemoryLayerSource` trait), so ingestion is modeled
/// here rather than inside `ib-retrieval` — see DESIGN.md.
#[async_trait]
pub trait MemorySummaryIngestor: Send + Sync {
    async fn ingest(&self, chat_id: &str, entries: Vec<MemorySummaryEntry>);
}

/// Inputs a caller assembles once per `generation_started` turn, beyond the
/// panel/strategy/data trio every turn already computes.
#[derive(Debug, Clone, Default)]
pub struct TurnOptions {
    pub memory_block: Option<String>,
}

/// Everything produced while assembling one turn's prompt, handed back so a
/// caller can log or test against it without re-deriving it.
#[derive(Debug, Clone)]
pub struct TurnPlan {
    pub enabled_panels: Vec<Panel>,
    pub strategy: UpdateStrategy,
    pub missing: Vec<MissingFieldReport>,
    pub prompt: String,
    pub api_target: ApiTarget,
}

/// Wires the ten spec components into the two turn-shaped entry points a
/// host calls: `generation_started` (prompt assembly) and `message_received`
/// (response parsing + data application). Every I/O-capable collaborator
/// (storage, rule manager, host, memory ingestion, retrieval) is injected at
/// construction so this type itself never touches the filesystem or network.
pub struct Engine {
    data_store: Box<dyn DataStore>,
    rule_provider: Box<dyn RuleProvider>,
    rule_catalog: RuleCatalog,
    updater: DataUpdater,
    memory_ingestor: Option<Box<dyn MemorySummaryIngestor>>,
    retrieval: Option<ContextualRetrieval>,
    status: tokio::sync::Mutex<StatusReport>,
}

impl Engine {
    pub fn new(
        data_store: Box<dyn DataStore>,
        rule_provider: Box<dyn RuleProvider>,
        memory_ingestor: Option<Box<dyn MemorySummaryIngestor>>,
        retrieval: Option<ContextualRetrieval>,
    ) -> Self {
        Self {
            data_store,
            rule_provider,
            rule_catalog: RuleCatalog::new(),
            updater: DataUpdater::new(),
            memory_ingestor,
            retrieval,
            status: tokio::sync::Mutex::new(StatusReport::default()),
        }
    }

    pub async fn status(&self) -> StatusReport {
        self.status.lock().await.clone()
    }

    /// `generation_started`: resolves enabled panels, reads current data,
    /// computes strategy and missing fields, renders rules, composes the
    /// prompt, and routes it to the host's injection surface.
    #[tracing::instrument(skip(self, host, config, options))]
    pub async fn generation_started(
        &self,
        host: &dyn HostContext,
        config: &ExtensionConfig,
        options: &TurnOptions,
        now_ms: i64,
    ) -> CoreResult<TurnPlan> {
        let enabled_panels = ib_panels::list_enabled(config);
        let chat_id = host.chat_id();

        let mut current: CurrentData = CurrentData::new();
        for panel in &enabled_panels {
            let rows = match self.data_store.get_panel_rows(&chat_id, &panel.id).await {
                Ok(rows) => rows,
                Err(err) => {
                    self.status.lock().await.record_error(err.to_string());
                    return Err(err);
                }
            };
            current.insert(panel.id.clone(), rows);
        }

        let strategy = ib_strategy::analyze(&enabled_panels, &current);
        let missing = ib_strategy::detect(&enabled_panels, &current);

        let rules_text = self.rule_catalog.render(self.rule_provider.as_ref(), now_ms).await;

        // `apiConfig.enabled` is the global switch an `auto`-mode module
        // defers to (§4.6): whether a custom API is configured at all.
        let resolved_target = resolve_api_target(
            config.basic.table_records.enabled,
            config.basic.table_records.api_mode,
            config.api_config.enabled,
        );
        let output_mode = match resolved_target {
            ApiTarget::Custom => OutputMode::CustomApi,
            ApiTarget::Main | ApiTarget::Disabled => OutputMode::MainApi,
        };

        let compose_options = ComposeOptions {
            armor_breaking_prompt: config.api_config.armor_breaking_prompt.as_deref().filter(|_| config.api_config.enable_armor_breaking),
            memory_block: options.memory_block.as_deref(),
        };

        let prompt = compose(&enabled_panels, &current, &strategy, &missing, &rules_text, output_mode, &compose_options);

        let position = config.prompt_position;
        let must_output_rules = "You MUST output the <infobar_data> block in every reply.";
        let prohibition_rules = "Do NOT output an <infobar_data> block; table records are handled elsewhere.";
        let api_target = InjectionDispatcher::route(
            host,
            &config.basic.table_records,
            config.api_config.enabled,
            &prompt,
            must_output_rules,
            prohibition_rules,
            position,
        )
        .await;

        Ok(TurnPlan { enabled_panels, strategy, missing, prompt, api_target })
    }

    /// `message_received`: parses the model's reply and applies any
    /// `add`/`update`/`delete` operations to the chat's panel tables,
    /// forwarding any `<ai_memory_summary>` entries to the memory ingestor.
    #[tracing::instrument(skip(self, host, enabled_panels, reply))]
    pub async fn message_received(
        &self,
        host: &dyn HostContext,
        enabled_panels: &[Panel],
        reply: &str,
        message_id: Option<String>,
        now_ms: i64,
    ) -> CoreResult<Vec<String>> {
        let chat_id = host.chat_id();

        let parsed: ParsedBlock = match ResponseParser::parse(reply, enabled_panels, "model", now_ms) {
            Ok(parsed) => parsed,
            Err(err) => {
                self.status.lock().await.record_error(err.to_string());
                return Err(err);
            }
        };

        let affected = match self.updater.apply(self.data_store.as_ref(), host, &chat_id, &parsed.operations, message_id, now_ms).await {
            Ok(affected) => affected,
            Err(err) => {
                self.status.lock().await.record_error(err.to_string());
                return Err(err);
            }
        };

        if let Some(ingestor) = &self.memory_ingestor {
            let entries = ResponseParser::parse_memory_summary(reply);
            if !entries.is_empty() {
                ingestor.ingest(&chat_id, entries).await;
            }
        }

        Ok(affected)
    }

    /// Delegates to [`ContextualRetrieval::hybrid_search`], if a retrieval
    /// engine was configured at construction. Absent a retrieval engine,
    /// returns `None` rather than an error — retrieval augments a turn, it
    /// does not gate it (§4.9: "runs orthogonally").
    pub async fn retrieve(
        &self,
        query: &str,
        query_embedding: Option<&[f32]>,
        conversation_history: &[String],
    ) -> Option<ib_core::HybridSearchOutcome> {
        let retrieval = self.retrieval.as_ref()?;
        Some(retrieval.hybrid_search(query, query_embedding, conversation_history).await)
    }
}
