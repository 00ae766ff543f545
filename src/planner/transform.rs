//! Rotation and resolution to filter-graph resolution

use serde::{Deserialize, Serialize};

use crate::domain::model::{Rotation, Scale, TransformSpec};

/// Filter graph computed for a transform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedTransform {
    /// Comma-separated filter chain, empty when nothing applies
    pub filter_graph: String,
    /// Whether a re-encode is required
    pub uses_filter: bool,
}

impl ResolvedTransform {
    /// Filter graph for the encoder, `None` when no filter applies
    pub fn filter(&self) -> Option<&str> {
        if self.uses_filter && !self.filter_graph.is_empty() {
            Some(&self.filter_graph)
        } else {
            None
        }
    }
}

/// Maps a [`TransformSpec`] to encoder filter fragments
pub struct TransformResolver;

impl TransformResolver {
    /// Rotation fragment, including its trailing separator
    pub fn rotation_fragment(rotation: Rotation) -> &'static str {
        match rotation {
            Rotation::None => "",
            Rotation::Cw90 => "transpose=1,",
            Rotation::Ccw90 => "transpose=2,",
            Rotation::Half => "rotate=PI:bilinear=0,",
        }
    }

    /// Scale fragment locking one axis to the selected size.
    ///
    /// A 180° turn keeps the frame's orientation, so the height is locked
    /// to the class's line count. No rotation or a transpose locks the width
    /// to the class's 16:9 width. The free axis follows the aspect ratio.
    pub fn scale_fragment(rotation: Rotation, scale: Scale) -> String {
        if rotation == Rotation::Half {
            return scale
                .pixels()
                .map(|height| format!("scale=-1:{}", height))
                .unwrap_or_default();
        }
        scale
            .width()
            .map(|width| format!("scale={}:-1", width))
            .unwrap_or_default()
    }

    /// Compose the full filter graph for a transform
    pub fn resolve(spec: &TransformSpec) -> ResolvedTransform {
        let mut filter_graph = String::from(Self::rotation_fragment(spec.rotate));
        filter_graph.push_str(&Self::scale_fragment(spec.rotate, spec.scale));
        let filter_graph = filter_graph.trim_end_matches(',').to_string();

        ResolvedTransform {
            filter_graph,
            uses_filter: spec.uses_filter(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROTATIONS: [Rotation; 4] = [Rotation::None, Rotation::Cw90, Rotation::Ccw90, Rotation::Half];
    const SCALES: [Scale; 4] = [Scale::P144, Scale::P360, Scale::P720, Scale::P1080];

    #[test]
    fn test_no_transform_resolves_empty() {
        let resolved = TransformResolver::resolve(&TransformSpec::default());
        assert_eq!(resolved.filter_graph, "");
        assert!(!resolved.uses_filter);
        assert_eq!(resolved.filter(), None);
    }

    #[test]
    fn test_rotation_only() {
        let cases = [
            (Rotation::Cw90, "transpose=1"),
            (Rotation::Ccw90, "transpose=2"),
            (Rotation::Half, "rotate=PI:bilinear=0"),
        ];
        for (rotation, expected) in cases {
            let resolved = TransformResolver::resolve(&TransformSpec::new(rotation, Scale::Native));
            assert_eq!(resolved.filter_graph, expected);
            assert!(resolved.uses_filter);
        }
    }

    #[test]
    fn test_half_turn_locks_height() {
        for scale in SCALES {
            let pixels = scale.pixels().unwrap();
            let resolved = TransformResolver::resolve(&TransformSpec::new(Rotation::Half, scale));
            assert_eq!(
                resolved.filter_graph,
                format!("rotate=PI:bilinear=0,scale=-1:{}", pixels)
            );
        }
    }

    #[test]
    fn test_transpose_or_none_locks_width() {
        for rotation in [Rotation::None, Rotation::Cw90, Rotation::Ccw90] {
            for scale in SCALES {
                let width = scale.width().unwrap();
                let resolved = TransformResolver::resolve(&TransformSpec::new(rotation, scale));
                assert!(
                    resolved.filter_graph.ends_with(&format!("scale={}:-1", width)),
                    "{:?}/{:?} -> {}",
                    rotation,
                    scale,
                    resolved.filter_graph
                );
            }
        }
    }

    #[test]
    fn test_rotate_and_scale_compose() {
        let resolved = TransformResolver::resolve(&TransformSpec::new(Rotation::Cw90, Scale::P720));
        assert_eq!(resolved.filter_graph, "transpose=1,scale=1280:-1");
        assert_eq!(resolved.filter(), Some("transpose=1,scale=1280:-1"));
    }

    #[test]
    fn test_resolve_is_pure() {
        for rotation in ROTATIONS {
            for scale in SCALES {
                let spec = TransformSpec::new(rotation, scale);
                assert_eq!(TransformResolver::resolve(&spec), TransformResolver::resolve(&spec));
            }
        }
    }

    #[test]
    fn test_toggling_rotation_keeps_scale_in_sync() {
        let mut spec = TransformSpec::new(Rotation::None, Scale::P360);
        for _ in 0..8 {
            spec.rotate = spec.rotate.next();
            let graph = TransformResolver::resolve(&spec).filter_graph;
            if spec.rotate == Rotation::Half {
                assert!(graph.ends_with("scale=-1:360"));
            } else {
                assert!(graph.ends_with("scale=640:-1"));
            }
        }
    }
}
