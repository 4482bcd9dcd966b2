//! Scene viewer
//!
//! Loads a RON scene description, builds it with the built-in node library,
//! commits it, emits it into a render queue and prints the serialized
//! records.
//!
//! ```text
//! scene_viewer [SCENE] [--config PATH]
//! ```

use std::path::{Path, PathBuf};

use clap::{Arg, ArgMatches, Command};
use scene_graph::config::{Config, ConfigError, SceneConfig};
use scene_graph::foundation::logging;
use scene_graph::nodes::register_builtin_nodes;
use scene_graph::scene::{
    CommitWalker, GraphBuilder, NodeDescription, RenderEmitter, RenderQueue, SceneError,
    SceneGraph, Serializer, TypeRegistry,
};
use thiserror::Error;

const DEFAULT_SCENE: &str = "scene_viewer/scenes/demo.ron";
const DEFAULT_LOG_FILTER: &str = "info";

/// Errors that end a viewer run
#[derive(Error, Debug)]
enum ViewerError {
    #[error("Scene error: {0}")]
    Scene(#[from] SceneError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Scene root could not be built")]
    EmptyScene,
}

struct SceneViewer {
    config: SceneConfig,
    registry: &'static TypeRegistry,
    graph: SceneGraph,
}

impl SceneViewer {
    fn new(config: SceneConfig) -> Result<Self, ViewerError> {
        let registry = TypeRegistry::global();
        register_builtin_nodes(registry)?;
        Ok(Self {
            config,
            registry,
            graph: SceneGraph::new(),
        })
    }

    fn run(&mut self, scene_path: &Path) -> Result<(), ViewerError> {
        let text = std::fs::read_to_string(scene_path).map_err(|source| ViewerError::Io {
            path: scene_path.to_path_buf(),
            source,
        })?;
        let description = NodeDescription::from_ron(&text)?;
        log::info!(
            "Loaded {} ({} node descriptions)",
            scene_path.display(),
            description.node_count()
        );

        let report = GraphBuilder::new(self.registry)
            .with_config(self.config.clone())
            .build(&mut self.graph, &description);
        if !report.is_clean() {
            log::warn!("Scene built with {} error(s)", report.errors.len());
        }
        let root = report.root.ok_or(ViewerError::EmptyScene)?;

        let stats = CommitWalker::commit(&mut self.graph, root);
        log::info!("Committed {} of {} nodes", stats.committed, stats.visited);

        let mut queue = RenderQueue::new();
        RenderEmitter::emit(&self.graph, root, &mut queue);
        for batch in queue.batches() {
            log::info!("{:?}: {} object(s)", batch.kind, batch.object_count());
            for object in &batch.objects {
                log::debug!("  {} -> {}", object.path, object.label);
            }
        }
        let bounds = queue.bounds();
        if !bounds.is_empty() {
            log::info!(
                "Scene bounds: {:?} .. {:?}",
                bounds.min.as_slice(),
                bounds.max.as_slice()
            );
        }

        let records = Serializer::serialize(&self.graph, root);
        println!("{}", Serializer::to_ron(&records)?);
        Ok(())
    }
}

fn load_config(path: Option<&str>) -> Result<SceneConfig, ViewerError> {
    let config = match path {
        Some(path) => SceneConfig::load_from_file(path)?,
        None => SceneConfig::default(),
    };
    config.validate()?;
    Ok(config)
}

fn cli() -> Command {
    Command::new("scene_viewer")
        .about("Builds, commits and emits a scene description, then prints its records")
        .arg(
            Arg::new("scene")
                .value_name("SCENE")
                .help("RON scene description to load")
                .default_value(DEFAULT_SCENE),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("PATH")
                .help("Scene configuration (.toml or .ron)"),
        )
}

fn scene_path(matches: &ArgMatches) -> PathBuf {
    PathBuf::from(
        matches
            .get_one::<String>("scene")
            .map_or(DEFAULT_SCENE, String::as_str),
    )
}

fn main() -> Result<(), ViewerError> {
    let matches = cli().get_matches();
    let scene_path = scene_path(&matches);
    let config = load_config(matches.get_one::<String>("config").map(String::as_str))?;

    logging::init_with_filter(config.log_filter.as_deref().unwrap_or(DEFAULT_LOG_FILTER));
    log::info!("Starting scene viewer");

    let mut viewer = SceneViewer::new(config)?;
    match viewer.run(&scene_path) {
        Ok(()) => {
            log::info!("Scene viewer finished successfully");
            Ok(())
        }
        Err(e) => {
            log::error!("Scene viewer error: {}", e);
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let matches = cli().try_get_matches_from(["scene_viewer"]).unwrap();
        assert_eq!(scene_path(&matches), PathBuf::from(DEFAULT_SCENE));
        assert!(matches.get_one::<String>("config").is_none());
    }

    #[test]
    fn test_scene_and_config() {
        let matches = cli()
            .try_get_matches_from(["scene_viewer", "city.ron", "--config", "viewer.toml"])
            .unwrap();
        assert_eq!(scene_path(&matches), PathBuf::from("city.ron"));
        assert_eq!(matches.get_one::<String>("config").unwrap(), "viewer.toml");
    }

    #[test]
    fn test_cli_is_well_formed() {
        cli().debug_assert();
    }
}
