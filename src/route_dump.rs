use crate::router::Path;
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufWriter, Write};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneDump {
    pub spacing: i32,
    pub routes: Vec<RouteDump>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteDump {
    pub id: String,
    pub solved: bool,
    pub points: Vec<[i32; 2]>,
    /// Indices into the scene's obstacle list.
    pub visible_obstacles: Vec<usize>,
}

impl RouteDump {
    pub fn from_path(path: &Path<String>, visible_obstacles: Vec<usize>) -> Self {
        RouteDump {
            id: path.data().cloned().unwrap_or_default(),
            solved: path.is_solved(),
            points: path.points().iter().map(|p| [p.x, p.y]).collect(),
            visible_obstacles,
        }
    }
}

/// Writes the dump as JSON to `output`, or to stdout when no path is given.
pub fn write_route_dump(
    output: Option<&std::path::Path>,
    dump: &SceneDump,
    pretty: bool,
) -> anyhow::Result<()> {
    match output {
        Some(path) => {
            let writer = BufWriter::new(File::create(path)?);
            write_json(writer, dump, pretty)
        }
        None => {
            let stdout = io::stdout();
            write_json(stdout.lock(), dump, pretty)
        }
    }
}

fn write_json<W: Write>(mut writer: W, dump: &SceneDump, pretty: bool) -> anyhow::Result<()> {
    if pretty {
        serde_json::to_writer_pretty(&mut writer, dump)?;
    } else {
        serde_json::to_writer(&mut writer, dump)?;
    }
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;

    #[test]
    fn dump_serializes_points_as_pairs() {
        let mut path = Path::with_data("edge".to_string(), (0, 0), (10, 0));
        path.points = vec![Point::new(0, 0), Point::new(10, 0)];
        let dump = SceneDump {
            spacing: 4,
            routes: vec![RouteDump::from_path(&path, vec![2])],
        };
        let mut buf = Vec::new();
        write_json(&mut buf, &dump, false).expect("write");
        let text = String::from_utf8(buf).expect("utf8");
        assert_eq!(
            text.trim_end(),
            r#"{"spacing":4,"routes":[{"id":"edge","solved":false,"points":[[0,0],[10,0]],"visibleObstacles":[2]}]}"#
        );
    }
}
