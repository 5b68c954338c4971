// One selection run: load data, predict, build the pool, pick the squad and
// write it out.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use fplsquad_core::cache::{PoolCache, PoolKey};
use fplsquad_core::persist::{load_prior_roster, save_selection};
use fplsquad_core::predict::{MedianPastScore, PredictionMethod, ScorePredictor};
use fplsquad_core::provider::build_pool;
use fplsquad_core::selection::{select_squad, ScanOptions, SquadSelection};
use tracing::info;

use crate::config::{Config, DataPaths};
use crate::data::{load_bootstrap, load_points, load_unavailable, FileHistory, FileProvider};

/// Per-run overrides, usually from the command line.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub gameweek: u32,
    /// Saved squad from the previous gameweek; enables the transfer scan.
    pub current_squad: Option<PathBuf>,
    pub free_transfers: Option<usize>,
    pub prediction_method: Option<String>,
    pub output: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub gameweek: u32,
    pub selection: SquadSelection,
    pub output: PathBuf,
    /// Display names from the snapshot, keyed by player id.
    pub player_names: HashMap<u32, String>,
}

impl RunSummary {
    pub fn substitutions(&self) -> Option<usize> {
        self.selection.decision.as_ref().map(|d| d.substitutions)
    }

    /// `"Name (id)"`, or just the id when the snapshot has no name.
    pub fn player_label(&self, id: u32) -> String {
        match self.player_names.get(&id) {
            Some(name) => format!("{name} ({id})"),
            None => id.to_string(),
        }
    }
}

fn predictor_for(
    method: PredictionMethod,
    config: &Config,
    history: FileHistory,
) -> Box<dyn ScorePredictor> {
    match method {
        PredictionMethod::MedianPastScore => Box::new(MedianPastScore::new(
            history,
            config.prediction.n_previous_weeks,
            config.prediction.min_required_weeks,
        )),
    }
}

/// Run a selection for `options.gameweek` with files resolved against
/// `base_dir`. Pools are shared through `cache` across runs.
pub fn run(
    base_dir: &Path,
    config: &Config,
    options: &RunOptions,
    cache: &PoolCache,
) -> anyhow::Result<RunSummary> {
    let method_id = options
        .prediction_method
        .as_deref()
        .unwrap_or(config.prediction.method.as_str());
    let prediction_method =
        PredictionMethod::parse(method_id).context("invalid prediction method")?;
    let selection_method = config.selection_method()?;

    let paths = &config.data_paths;
    let bootstrap = load_bootstrap(&DataPaths::resolve(base_dir, &paths.bootstrap))
        .context("failed to load bootstrap snapshot")?;
    if let Some(deadline) = bootstrap
        .event(options.gameweek)
        .and_then(|e| e.deadline_time)
    {
        info!("Gameweek {} deadline: {}", options.gameweek, deadline);
    }
    let points = load_points(&DataPaths::resolve(base_dir, &paths.history))
        .context("failed to load points history")?;
    let unavailable = load_unavailable(&DataPaths::resolve(base_dir, &paths.unavailable))
        .context("failed to load unavailable players")?;

    let player_names: HashMap<u32, String> = bootstrap
        .records()
        .into_iter()
        .filter_map(|r| r.name.map(|name| (r.id, name)))
        .collect();
    let history = FileHistory::new(bootstrap.events.clone(), points);
    let provider = FileProvider::new(bootstrap, unavailable);
    let predictor = predictor_for(prediction_method, config, history);

    let key = PoolKey::new(options.gameweek, prediction_method)
        .with_param("n_previous_weeks", config.prediction.n_previous_weeks)
        .with_param("min_required_weeks", config.prediction.min_required_weeks);
    let pool = cache
        .get_or_build(&key, || build_pool(&provider, predictor.as_ref(), options.gameweek))
        .context("failed to build candidate pool")?;

    let prior = match &options.current_squad {
        Some(path) => Some(
            load_prior_roster(path)
                .with_context(|| format!("failed to read current squad {}", path.display()))?,
        ),
        None => None,
    };

    let scan = ScanOptions {
        free_transfers: options
            .free_transfers
            .unwrap_or(config.strategy.free_transfers),
        max_substitutions: config.strategy.max_substitutions,
        parallel: config.strategy.parallel_scan,
    };
    let selection = select_squad(
        &pool,
        &config.ruleset,
        &selection_method,
        prior.as_ref(),
        &scan,
    )
    .context("squad selection failed")?;

    let output = options
        .output
        .clone()
        .unwrap_or_else(|| DataPaths::resolve(base_dir, &paths.output));
    save_selection(&output, &selection.squad)
        .with_context(|| format!("failed to write {}", output.display()))?;

    info!(
        "Gameweek {}: expected score {:.2}, {} transfers",
        options.gameweek,
        selection.total_score(),
        selection.squad.transfers.unwrap_or(0)
    );
    Ok(RunSummary {
        gameweek: options.gameweek,
        selection,
        output,
        player_names,
    })
}
