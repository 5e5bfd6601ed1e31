//! Host-side collaborators: what gets retextured and how it is found.

use image::DynamicImage;
use std::marker::PhantomData;
use std::sync::Arc;

/// An object whose surface image can be read and replaced.
pub trait SurfaceTarget: Send + Sync {
    fn name(&self) -> String;
    fn current_image(&self) -> Option<DynamicImage>;
    /// Called once per successful job, after the result has been decoded.
    fn apply_image(&self, image: &DynamicImage);
}

pub trait TargetResolver: Send + Sync {
    fn resolve_current_target(&self) -> Option<Arc<dyn SurfaceTarget>>;
}

/// A node in the host's containment hierarchy.
pub trait SceneNode: Sized {
    /// The surface attached directly to this node, if any.
    fn surface(&self) -> Option<Arc<dyn SurfaceTarget>>;
    fn children(&self) -> Vec<Self>;
    fn parent(&self) -> Option<Self>;
}

/// Finds the surface for a selected node: the node itself, then its
/// descendants depth-first, then its ancestors nearest first.
pub fn find_surface<N: SceneNode>(selected: &N) -> Option<Arc<dyn SurfaceTarget>> {
    if let Some(surface) = selected.surface() {
        return Some(surface);
    }

    let mut stack: Vec<N> = selected.children().into_iter().rev().collect();
    while let Some(node) = stack.pop() {
        if let Some(surface) = node.surface() {
            return Some(surface);
        }
        stack.extend(node.children().into_iter().rev());
    }

    let mut current = selected.parent();
    while let Some(node) = current {
        if let Some(surface) = node.surface() {
            return Some(surface);
        }
        current = node.parent();
    }

    None
}

/// Resolves the selection reported by `selection` through [`find_surface`].
pub struct HierarchyResolver<N, F> {
    selection: F,
    _node: PhantomData<fn() -> N>,
}

impl<N, F> HierarchyResolver<N, F>
where
    N: SceneNode,
    F: Fn() -> Option<N> + Send + Sync,
{
    pub fn new(selection: F) -> Self {
        Self {
            selection,
            _node: PhantomData,
        }
    }
}

impl<N, F> TargetResolver for HierarchyResolver<N, F>
where
    N: SceneNode,
    F: Fn() -> Option<N> + Send + Sync,
{
    fn resolve_current_target(&self) -> Option<Arc<dyn SurfaceTarget>> {
        let selected = (self.selection)()?;
        let surface = find_surface(&selected);
        if surface.is_none() {
            log::warn!("Selected object has no surface in its hierarchy");
        }
        surface
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingTarget;

    struct Scene {
        parents: Vec<Option<usize>>,
        surfaces: Vec<Option<Arc<dyn SurfaceTarget>>>,
    }

    #[derive(Clone)]
    struct Node {
        scene: Arc<Scene>,
        id: usize,
    }

    impl SceneNode for Node {
        fn surface(&self) -> Option<Arc<dyn SurfaceTarget>> {
            self.scene.surfaces[self.id].clone()
        }

        fn children(&self) -> Vec<Self> {
            self.scene
                .parents
                .iter()
                .enumerate()
                .filter(|(_, parent)| **parent == Some(self.id))
                .map(|(id, _)| Node {
                    scene: Arc::clone(&self.scene),
                    id,
                })
                .collect()
        }

        fn parent(&self) -> Option<Self> {
            self.scene.parents[self.id].map(|id| Node {
                scene: Arc::clone(&self.scene),
                id,
            })
        }
    }

    fn surface(name: &str) -> Option<Arc<dyn SurfaceTarget>> {
        Some(Arc::new(RecordingTarget::named(name)))
    }

    //        0 (root, "body")
    //       / \
    //      1   2
    //      |   |
    //      3   4 ("wheel")
    //      |
    //      5 ("hubcap")
    fn scene(with_root_surface: bool) -> Arc<Scene> {
        Arc::new(Scene {
            parents: vec![None, Some(0), Some(0), Some(1), Some(2), Some(3)],
            surfaces: vec![
                if with_root_surface { surface("body") } else { None },
                None,
                None,
                None,
                surface("wheel"),
                surface("hubcap"),
            ],
        })
    }

    fn node(scene: &Arc<Scene>, id: usize) -> Node {
        Node {
            scene: Arc::clone(scene),
            id,
        }
    }

    #[test]
    fn prefers_the_selected_node() {
        let scene = scene(true);
        assert_eq!(find_surface(&node(&scene, 4)).unwrap().name(), "wheel");
    }

    #[test]
    fn searches_descendants_depth_first_before_ancestors() {
        let bare_root = scene(false);
        assert_eq!(find_surface(&node(&bare_root, 0)).unwrap().name(), "hubcap");

        let scene = scene(true);
        assert_eq!(find_surface(&node(&scene, 1)).unwrap().name(), "hubcap");
    }

    #[test]
    fn falls_back_to_nearest_ancestor() {
        let scene = Arc::new(Scene {
            parents: vec![None, Some(0), Some(0), Some(1), Some(2), Some(3)],
            surfaces: vec![surface("body"), None, None, None, None, None],
        });
        assert_eq!(find_surface(&node(&scene, 5)).unwrap().name(), "body");
    }

    #[test]
    fn resolver_reports_nothing_without_selection_or_surface() {
        let empty = Arc::new(Scene {
            parents: vec![None, Some(0)],
            surfaces: vec![None, None],
        });
        let resolver = HierarchyResolver::new(|| None::<Node>);
        assert!(resolver.resolve_current_target().is_none());

        let selected = node(&empty, 1);
        let resolver = HierarchyResolver::new(move || Some(selected.clone()));
        assert!(resolver.resolve_current_target().is_none());
    }
}
