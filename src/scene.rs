use std::collections::HashMap;

use anyhow::Context;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::config::RouterConfig;
use crate::error::RouterError;
use crate::geometry::{Point, Rect};
use crate::route_dump::{RouteDump, SceneDump};
use crate::router::{Path, Router};

/// A routing problem as read from disk: obstacles plus the connectors to route.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scene {
    /// Overrides the configured spacing for this scene.
    #[serde(default)]
    pub spacing: Option<i32>,
    #[serde(default)]
    pub obstacles: Vec<Rect>,
    #[serde(default)]
    pub paths: Vec<ScenePath>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenePath {
    #[serde(default)]
    pub id: Option<String>,
    pub start: Point,
    pub end: Point,
    #[serde(default)]
    pub bend_points: Vec<Point>,
}

/// Parses a scene from strict JSON, falling back to JSON5 for hand-written input.
pub fn parse_scene(input: &str) -> anyhow::Result<Scene> {
    match serde_json::from_str::<Scene>(input) {
        Ok(scene) => Ok(scene),
        Err(json_err) => json5::from_str::<Scene>(input)
            .with_context(|| format!("scene is neither JSON ({json_err}) nor JSON5")),
    }
}

impl Scene {
    /// Routes every path of the scene on a fresh router.
    pub fn route(&self, config: &RouterConfig) -> Result<SceneDump, RouterError> {
        let mut config = config.clone();
        if let Some(spacing) = self.spacing {
            config.spacing = spacing;
        }
        let mut router: Router<String> = Router::with_config(config);
        for bounds in &self.obstacles {
            router.add_obstacle(*bounds);
        }
        let obstacle_index: HashMap<_, _> = router
            .obstacles()
            .enumerate()
            .map(|(index, obstacle)| (obstacle.id(), index))
            .collect();

        let mut ids = Vec::with_capacity(self.paths.len());
        for (index, scene_path) in self.paths.iter().enumerate() {
            let name = scene_path
                .id
                .clone()
                .unwrap_or_else(|| format!("path{index}"));
            let mut path = Path::with_data(name, scene_path.start, scene_path.end);
            if !scene_path.bend_points.is_empty() {
                path.set_bend_points(scene_path.bend_points.clone());
            }
            ids.push(router.add_path(path));
        }

        router.solve()?;

        let mut routes = Vec::with_capacity(ids.len());
        for id in ids {
            let path = router.path(id).ok_or(RouterError::UnknownPath(id))?;
            let mut visible: Vec<usize> = router
                .visible_obstacles(id)?
                .iter()
                .filter_map(|obstacle| obstacle_index.get(obstacle).copied())
                .collect();
            visible.sort_unstable();
            routes.push(RouteDump::from_path(path, visible));
        }
        debug!("routed {} path(s) around {} obstacle(s)", routes.len(), obstacle_index.len());

        Ok(SceneDump {
            spacing: router.spacing(),
            routes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_strict_json() {
        let scene = parse_scene(
            r#"{
                "spacing": 6,
                "obstacles": [{ "x": 45, "y": 45, "width": 10, "height": 10 }],
                "paths": [{ "id": "a", "start": { "x": 0, "y": 0 }, "end": { "x": 100, "y": 100 } }]
            }"#,
        )
        .expect("json");
        assert_eq!(scene.spacing, Some(6));
        assert_eq!(scene.obstacles, vec![Rect::new(45, 45, 10, 10)]);
        assert_eq!(scene.paths[0].id.as_deref(), Some("a"));
        assert!(scene.paths[0].bend_points.is_empty());
    }

    #[test]
    fn falls_back_to_json5() {
        let scene = parse_scene(
            "{
                // unquoted keys and trailing commas
                paths: [{ start: { x: 0, y: 0 }, end: { x: 10, y: 0 }, bendPoints: [{ x: 5, y: 5 },], },],
            }",
        )
        .expect("json5");
        assert!(scene.obstacles.is_empty());
        assert_eq!(scene.paths[0].bend_points, vec![Point::new(5, 5)]);
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(parse_scene("paths = []").is_err());
    }

    #[test]
    fn route_names_paths_and_reports_visible_obstacles() {
        let scene = Scene {
            spacing: None,
            obstacles: vec![Rect::new(200, 200, 10, 10), Rect::new(45, 45, 10, 10)],
            paths: vec![ScenePath {
                id: None,
                start: Point::new(0, 0),
                end: Point::new(100, 100),
                bend_points: Vec::new(),
            }],
        };
        let dump = scene.route(&RouterConfig::default()).expect("route");
        assert_eq!(dump.spacing, 4);
        let route = &dump.routes[0];
        assert_eq!(route.id, "path0");
        assert!(route.solved);
        assert_eq!(route.points, vec![[0, 0], [41, 58], [100, 100]]);
        assert_eq!(route.visible_obstacles, vec![1]);
    }

    #[test]
    fn scene_spacing_overrides_config() {
        let scene = Scene {
            spacing: Some(6),
            obstacles: vec![Rect::new(45, 45, 10, 10)],
            paths: vec![ScenePath {
                id: Some("e".into()),
                start: Point::new(0, 0),
                end: Point::new(100, 100),
                bend_points: Vec::new(),
            }],
        };
        let dump = scene.route(&RouterConfig::default()).expect("route");
        assert_eq!(dump.spacing, 6);
        assert_eq!(dump.routes[0].points[1], [39, 60]);
    }
}
