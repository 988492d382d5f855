//! Output naming and placement
//!
//! A kept clip is named `<container>_<soundID>.wav` and lands either flat in
//! the output root or inside a per-container subdirectory. Pure path
//! arithmetic; nothing here touches the filesystem.

use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct OutputPlanner {
    output_root: PathBuf,
    group_by_container: bool,
}

impl OutputPlanner {
    pub fn new(output_root: impl Into<PathBuf>, group_by_container: bool) -> Self {
        Self {
            output_root: output_root.into(),
            group_by_container,
        }
    }

    /// Canonical output identifier: `<container>_<soundID>`, the ID rendered
    /// as its decimal signed value (the format does not guarantee
    /// non-negative IDs).
    pub fn base_name(&self, container_id: &str, sound_id: i16) -> String {
        format!("{}_{}", container_id, sound_id)
    }

    /// Directory a grouped container's clips are planned into.
    pub fn container_dir(&self, container_id: &str) -> PathBuf {
        self.output_root.join(container_id)
    }

    /// Destination path for one kept clip. Clips in the same container that
    /// share a sound ID map to the same path; the pipeline reports that as a
    /// collision warning.
    pub fn clip_path(&self, container_id: &str, sound_id: i16) -> PathBuf {
        let file = format!("{}.wav", self.base_name(container_id, sound_id));
        if self.group_by_container {
            self.container_dir(container_id).join(file)
        } else {
            self.output_root.join(file)
        }
    }

    pub fn output_root(&self) -> &Path {
        &self.output_root
    }

    pub fn group_by_container(&self) -> bool {
        self.group_by_container
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_layout() {
        let planner = OutputPlanner::new("output", false);
        assert_eq!(
            planner.clip_path("SCENE01", 12),
            PathBuf::from("output/SCENE01_12.wav")
        );
    }

    #[test]
    fn grouped_layout() {
        let planner = OutputPlanner::new("output", true);
        assert_eq!(
            planner.clip_path("SCENE01", 12),
            PathBuf::from("output/SCENE01/SCENE01_12.wav")
        );
        assert_eq!(
            planner.container_dir("SCENE01"),
            PathBuf::from("output/SCENE01")
        );
    }

    #[test]
    fn negative_sound_id_keeps_the_sign() {
        let planner = OutputPlanner::new("output", false);
        assert_eq!(planner.base_name("SCENE01", -7), "SCENE01_-7");
        assert_eq!(
            planner.clip_path("SCENE01", -7),
            PathBuf::from("output/SCENE01_-7.wav")
        );
    }
}
