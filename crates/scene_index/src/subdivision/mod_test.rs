use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::*;

/// Builds a tree split uniformly to `depth`.
fn uniform<T: Topology>(depth: u32) -> SubdivisionTree<T, u32> {
  let mut tree = SubdivisionTree::new(0);
  let mut level = vec![tree.root()];
  for d in 1..=depth {
    let mut next = Vec::new();
    for id in level {
      next.extend(tree.split_with(id, |_, _| d));
    }
    level = next;
  }
  tree
}

fn assert_structure<T: Topology, P>(tree: &SubdivisionTree<T, P>) {
  for node in tree.iter() {
    let id = node.id();
    let live = tree.children(id).count();
    assert!(
      live == 0 || live == T::CHILD_COUNT,
      "{:?} has a partial split ({} children)",
      id,
      live
    );
    assert_eq!(tree.is_leaf(id), live == 0);

    match tree.parent(id) {
      Some(parent) => {
        assert_eq!(tree.depth(id), tree.depth(parent) + 1, "depth must grow by one");
        let slot = tree.child_slot(id).unwrap();
        assert_eq!(tree.child(parent, slot), Some(id));
      }
      None => assert_eq!(id, tree.root()),
    }

    for &dir in T::DIRECTIONS {
      if let Some(other) = tree.neighbour(id, dir) {
        assert_eq!(
          tree.neighbour(other, dir.opposite()),
          Some(id),
          "{:?} -> {:?} -> {:?} is not symmetric",
          id,
          dir,
          other
        );
        assert_eq!(tree.depth(other), tree.depth(id), "neighbours share a depth");
      }
    }
  }
}

// =========================================================================
// Basic structure
// =========================================================================

#[test]
fn test_new_tree_is_single_leaf() {
  let tree: QuadTree<&str> = SubdivisionTree::new("root");
  let root = tree.root();

  assert_eq!(tree.node_count(), 1);
  assert!(tree.is_leaf(root));
  assert!(tree.is_root(root));
  assert_eq!(tree.depth(root), 0);
  assert_eq!(tree.child_slot(root), None);
  assert_eq!(*tree.data(root), "root");
  assert!(tree.neighbours(root).iter().all(Option::is_none));
  assert_eq!(tree.neighbours(root).len(), 4);
}

#[test]
fn test_split_creates_all_children() {
  let mut tree: OctTree<()> = SubdivisionTree::default();
  let root = tree.root();
  let children = tree.split(root);

  assert_eq!(children.len(), 8);
  assert_eq!(tree.node_count(), 9);
  assert!(!tree.is_leaf(root));
  for (slot, &child) in children.iter().enumerate() {
    assert_eq!(tree.child(root, slot), Some(child));
    assert_eq!(tree.parent(child), Some(root));
    assert_eq!(tree.child_slot(child), Some(slot));
    assert_eq!(tree.depth(child), 1);
    assert!(tree.is_leaf(child));
  }
}

#[test]
fn test_child_out_of_range_is_none() {
  let mut tree: QuadTree<()> = SubdivisionTree::default();
  let root = tree.root();
  assert_eq!(tree.child(root, 0), None, "leaf has no children");

  tree.split(root);
  assert!(tree.child(root, 3).is_some());
  assert_eq!(tree.child(root, 4), None);
  assert_eq!(tree.child(root, usize::MAX), None);
}

#[test]
fn test_split_with_derives_payloads() {
  let mut tree: QuadTree<String> = SubdivisionTree::new("r".to_string());
  let root = tree.root();
  let children = tree.split_with(root, |slot, parent| format!("{}{}", parent, slot));

  let names: Vec<_> = children.iter().map(|c| tree.data(*c).as_str()).collect();
  assert_eq!(names, ["r0", "r1", "r2", "r3"]);
}

#[test]
fn test_set_data_returns_previous() {
  let mut tree: QuadTree<u8> = SubdivisionTree::new(1);
  let root = tree.root();
  assert_eq!(tree.set_data(root, 2), 1);
  *tree.data_mut(root) += 1;
  assert_eq!(*tree.data(root), 3);
}

/// Splitting twice without a merge is a structural fault.
#[test]
#[should_panic(expected = "child already exists")]
fn test_double_split_panics() {
  let mut tree: QuadTree<()> = SubdivisionTree::default();
  let root = tree.root();
  tree.split(root);
  tree.split(root);
}

#[test]
fn test_double_split_leaves_children_intact() {
  let mut tree: QuadTree<()> = SubdivisionTree::default();
  let root = tree.root();
  let children = tree.split(root);

  let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
    tree.split(root);
  }));
  assert!(result.is_err());
  assert_eq!(tree.node_count(), 5, "a failed split must not allocate");
  assert_eq!(tree.children(root).collect::<Vec<_>>(), children.to_vec());
}

#[test]
#[should_panic(expected = "has no Top neighbour slot")]
fn test_quad_vertical_neighbour_panics() {
  let tree: QuadTree<()> = SubdivisionTree::default();
  tree.neighbour(tree.root(), Direction::Top);
}

// =========================================================================
// Merge and stale handles
// =========================================================================

#[test]
fn test_split_then_merge_round_trips() {
  let mut tree = uniform::<Quad>(1);
  let target = tree.child(tree.root(), 2).unwrap();
  let before_payload = *tree.data(target);
  let before_neighbours = tree.neighbours(target);
  let before_count = tree.node_count();

  tree.split(target);
  let freed = tree.merge(target);

  assert_eq!(freed, 4);
  assert!(tree.is_leaf(target));
  assert_eq!(*tree.data(target), before_payload);
  assert_eq!(tree.neighbours(target), before_neighbours);
  assert_eq!(tree.node_count(), before_count);
}

#[test]
fn test_merge_frees_whole_subtree() {
  let mut tree = uniform::<Oct>(2);
  assert_eq!(tree.node_count(), 1 + 8 + 64);

  let root = tree.root();
  let freed = tree.merge(root);
  assert_eq!(freed, 72);
  assert_eq!(tree.node_count(), 1);
  assert!(tree.is_leaf(root));
}

#[test]
fn test_merge_leaf_is_noop() {
  let mut tree: QuadTree<()> = SubdivisionTree::default();
  let root = tree.root();
  assert_eq!(tree.merge(root), 0);
  assert!(tree.is_leaf(root));
}

/// Links into a merged subtree read back as absent.
#[test]
fn test_stale_links_after_merge_are_absent() {
  let mut tree = uniform::<Quad>(2);
  let root = tree.root();
  let ul = tree.child(root, 0).unwrap();
  let ur = tree.child(root, 1).unwrap();
  let ur_left_child = tree.child(ur, 0).unwrap();
  let ul_right_child = tree.child(ul, 1).unwrap();
  assert_eq!(tree.neighbour(ur_left_child, Direction::Left), Some(ul_right_child));

  tree.merge(ul);

  assert!(!tree.contains(ul_right_child));
  assert!(tree.node(ul_right_child).is_none());
  assert_eq!(tree.neighbour(ur_left_child, Direction::Left), None);
  assert_eq!(tree.neighbours(ur_left_child)[Direction::Left.index()], None);
  assert_structure(&tree);
}

/// Re-splitting reuses arena slots but never revives old handles.
#[test]
fn test_resplit_rewires_with_fresh_handles() {
  let mut tree = uniform::<Quad>(2);
  let root = tree.root();
  let ul = tree.child(root, 0).unwrap();
  let ur = tree.child(root, 1).unwrap();
  let old = tree.child(ul, 1).unwrap();

  tree.merge(ul);
  let fresh = tree.split(ul);

  assert!(!tree.contains(old));
  assert_ne!(fresh[1], old);
  assert_eq!(fresh[1].index(), old.index(), "freed slots are reused");
  let across = tree.child(ur, 0).unwrap();
  assert_eq!(tree.neighbour(fresh[1], Direction::Right), Some(across));
  assert_eq!(tree.neighbour(across, Direction::Left), Some(fresh[1]));
  assert_structure(&tree);
}

#[test]
#[should_panic(expected = "does not exist")]
fn test_stale_handle_access_panics() {
  let mut tree = uniform::<Quad>(1);
  let child = tree.child(tree.root(), 0).unwrap();
  let root = tree.root();
  tree.merge(root);
  tree.depth(child);
}

// =========================================================================
// Traversal
// =========================================================================

#[test]
fn test_traverse_is_preorder_in_slot_order() {
  let mut tree: QuadTree<String> = SubdivisionTree::new(String::new());
  let root = tree.root();
  let children = tree.split_with(root, |slot, _| slot.to_string());
  tree.split_with(children[1], |slot, parent| format!("{}{}", parent, slot));

  let mut visited = Vec::new();
  tree.traverse(|payload, depth| visited.push((payload.clone(), depth)));

  let expected: Vec<(String, u32)> = [
    ("", 0),
    ("0", 1),
    ("1", 1),
    ("10", 2),
    ("11", 2),
    ("12", 2),
    ("13", 2),
    ("2", 1),
    ("3", 1),
  ]
  .iter()
  .map(|(s, d)| (s.to_string(), *d))
  .collect();
  assert_eq!(visited, expected);
}

#[test]
fn test_traverse_from_subtree() {
  let tree = uniform::<Quad>(2);
  let child = tree.child(tree.root(), 3).unwrap();
  let mut count = 0;
  tree.traverse_from(child, |_, depth| {
    assert!(depth >= 1);
    count += 1;
  });
  assert_eq!(count, 5);
}

#[test]
fn test_leaves_of_uniform_tree() {
  let quad = uniform::<Quad>(3);
  assert_eq!(quad.leaves().count(), 64);
  assert!(quad.leaves().all(|leaf| leaf.depth() == 3));

  let oct = uniform::<Oct>(2);
  assert_eq!(oct.leaves().count(), 64);
}

#[test]
fn test_node_ref_navigation() {
  let tree = uniform::<Oct>(1);
  let root = tree.node(tree.root()).unwrap();
  assert_eq!(root.children().count(), 8);

  let first = root.children().next().unwrap();
  assert_eq!(first.parent().map(|p| p.id()), Some(root.id()));
  let above = first.neighbour(Direction::Top).unwrap();
  assert_eq!(tree.child_slot(above.id()), Some(4));
  assert_eq!(*above.data(), 1);
}

// =========================================================================
// Random split/merge sequences
// =========================================================================

fn random_ops<T: Topology>(seed: u64) -> SubdivisionTree<T, u32> {
  let mut rng = StdRng::seed_from_u64(seed);
  let mut tree = SubdivisionTree::new(0);

  for _ in 0..200 {
    let live: Vec<NodeId> = tree.iter().map(|n| n.id()).collect();
    let id = live[rng.random_range(0..live.len())];
    if tree.is_leaf(id) {
      if tree.depth(id) < 4 && tree.node_count() < 2_000 {
        tree.split(id);
      }
    } else if rng.random_bool(0.2) {
      tree.merge(id);
    }
  }
  tree
}

#[test]
fn test_random_quad_sequences_keep_invariants() {
  for seed in 0..16 {
    let tree = random_ops::<Quad>(seed);
    assert_structure(&tree);
  }
}

#[test]
fn test_random_oct_sequences_keep_invariants() {
  for seed in 0..8 {
    let tree = random_ops::<Oct>(seed);
    assert_structure(&tree);
  }
}

#[test]
fn test_node_count_matches_iteration() {
  for seed in 0..8 {
    let tree = random_ops::<Quad>(seed);
    assert_eq!(tree.iter().count(), tree.node_count(), "seed {}", seed);
  }
}
