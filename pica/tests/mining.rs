//! End-to-end mining runs over concrete trees.

use pica::{
    DataRecord, GNode, MineTree, MiningConfig, NodeData, NormalizedLevenshtein, Similarity, Tree,
    compute_distances, extract_records, find_data_regions, mine, mine_with_metric,
};

/// Markup equality as a distance-shaped metric: 0.0 means identical.
fn eq_metric() -> impl Fn(&str, &str) -> f64 {
    |a: &str, b: &str| if a == b { 0.0 } else { 1.0 }
}

/// `html > body > div > <list>` scaffolding; the list sits at depth 3, the
/// shallowest depth the default gate analyzes.
fn scaffold(list_tag: &str) -> (Tree, pica::indextree::NodeId) {
    let mut tree = Tree::new(NodeData::new("html", ""));
    let body = tree.add_child(tree.root, NodeData::new("body", ""));
    let div = tree.add_child(body, NodeData::new("div", ""));
    let list = tree.add_child(div, NodeData::new(list_tag, ""));
    (tree, list)
}

#[test]
fn test_repeated_rows_become_records() {
    let (mut tree, list) = scaffold("ul");
    for i in 0..5 {
        let li = tree.add_child(list, NodeData::new("li", "<li>row</li>"));
        tree.add_child(li, NodeData::new("b", "<b>name</b>"));
        tree.add_child(li, NodeData::new("i", format!("<i>{i}</i>")));
    }

    let harvest = mine_with_metric(&tree, &eq_metric(), &MiningConfig::default()).unwrap();

    assert_eq!(harvest.regions.len(), 1);
    let region = harvest.regions[0];
    assert_eq!(region.parent, list);
    assert_eq!(region.gnode_size, 1);
    assert_eq!(region.first_gnode_start_index, 0);
    assert_eq!(region.n_nodes_covered, 5);

    // Each row's children differ from one another, so every window stays one
    // whole record.
    assert_eq!(harvest.records.len(), 5);
    for (i, record) in harvest.records.iter().enumerate() {
        assert_eq!(record.gnodes(), &[GNode::new(list, i, i + 1)]);
        let lists = record.node_lists(&tree).unwrap();
        assert_eq!(lists, vec![vec![tree.child(list, i).unwrap()]]);
    }

    assert_eq!(harvest.index.name(list), Some("ul-00000"));
    assert_eq!(
        harvest.index.resolve("li-00003").unwrap(),
        tree.child(list, 3).unwrap()
    );
}

#[test]
fn test_rows_with_uniform_children_explode_per_child() {
    let (mut tree, list) = scaffold("ul");
    let mut rows = Vec::new();
    for _ in 0..4 {
        let li = tree.add_child(list, NodeData::new("li", "<li>row</li>"));
        tree.add_child(li, NodeData::new("em", "<em>x</em>"));
        tree.add_child(li, NodeData::new("em", "<em>x</em>"));
        rows.push(li);
    }

    let harvest = mine_with_metric(&tree, &eq_metric(), &MiningConfig::default()).unwrap();

    // Four rows, each split into its two children.
    assert_eq!(harvest.records.len(), 8);
    let mut expected = Vec::new();
    for &row in &rows {
        for j in 0..2 {
            expected.push(DataRecord::single(GNode::new(row, j, j + 1)));
        }
    }
    assert_eq!(harvest.records, expected);
}

#[test]
fn test_table_rows_stay_whole() {
    let (mut tree, table) = scaffold("table");
    for _ in 0..4 {
        let trow = tree.add_child(table, NodeData::new("tr", "<tr>row</tr>"));
        tree.add_child(trow, NodeData::new("td", "<td>x</td>"));
        tree.add_child(trow, NodeData::new("td", "<td>x</td>"));
    }

    let harvest = mine_with_metric(&tree, &eq_metric(), &MiningConfig::default()).unwrap();

    // Identical cells would explode any other tag; `tr` is exempt.
    assert_eq!(harvest.records.len(), 4);
    for (i, record) in harvest.records.iter().enumerate() {
        assert_eq!(record.gnodes(), &[GNode::new(table, i, i + 1)]);
    }
}

#[test]
fn test_alternating_pairs_mine_as_column_records() {
    // dt/dd alternation repeats with width 2, and every member has two
    // uniform children, so extraction produces non-contiguous column records
    // spanning both subtrees of each window.
    let (mut tree, list) = scaffold("dl");
    let mut members = Vec::new();
    for _ in 0..3 {
        let dt = tree.add_child(list, NodeData::new("dt", "<dt>term</dt>"));
        let dd = tree.add_child(list, NodeData::new("dd", "<dd>def</dd>"));
        for node in [dt, dd] {
            tree.add_child(node, NodeData::new("em", "<em>z</em>"));
            tree.add_child(node, NodeData::new("em", "<em>z</em>"));
        }
        members.push((dt, dd));
    }

    let harvest = mine_with_metric(&tree, &eq_metric(), &MiningConfig::default()).unwrap();

    // The width-2 run over the whole list sorts first; each member's own
    // two-child run is also discovered but resolves to nothing below.
    let region = harvest.regions[0];
    assert_eq!(region.parent, list);
    assert_eq!((region.gnode_size, region.n_nodes_covered), (2, 6));

    // Three windows, two columns each.
    assert_eq!(harvest.records.len(), 6);
    for (w, &(dt, dd)) in members.iter().enumerate() {
        for col in 0..2 {
            let record = &harvest.records[2 * w + col];
            assert_eq!(
                record.gnodes(),
                &[GNode::new(dt, col, col + 1), GNode::new(dd, col, col + 1)]
            );
        }
    }
}

#[test]
fn test_shallow_document_yields_empty_harvest() {
    // The repeating list sits at depth 2, below the default gate.
    let mut tree = Tree::new(NodeData::new("html", ""));
    let body = tree.add_child(tree.root, NodeData::new("body", ""));
    let list = tree.add_child(body, NodeData::new("ul", ""));
    for _ in 0..5 {
        tree.add_child(list, NodeData::new("li", "<li>row</li>"));
    }

    let harvest = mine_with_metric(&tree, &eq_metric(), &MiningConfig::default()).unwrap();
    assert!(harvest.regions.is_empty());
    assert!(harvest.records.is_empty());
    // The whole tree was still visited and named.
    assert_eq!(harvest.index.len(), 8);
}

#[test]
fn test_document_without_repetition_yields_empty_harvest() {
    let (mut tree, list) = scaffold("div");
    for tag in ["h1", "p", "form"] {
        tree.add_child(list, NodeData::new(tag, format!("<{tag}>unique</{tag}>")));
    }

    let harvest = mine_with_metric(&tree, &eq_metric(), &MiningConfig::default()).unwrap();
    assert!(harvest.regions.is_empty());
    assert!(harvest.records.is_empty());
}

#[test]
fn test_runs_are_deterministic() {
    let (mut tree, list) = scaffold("ul");
    for i in 0..6 {
        let li = tree.add_child(list, NodeData::new("li", "<li>row</li>"));
        tree.add_child(li, NodeData::new("span", format!("<span>{i}</span>")));
        tree.add_child(li, NodeData::new("span", "<span>tail</span>"));
    }

    let a = mine_with_metric(&tree, &eq_metric(), &MiningConfig::default()).unwrap();
    let b = mine_with_metric(&tree, &eq_metric(), &MiningConfig::default()).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_staged_phases_match_one_shot_run() {
    let (mut tree, list) = scaffold("ul");
    for _ in 0..4 {
        let li = tree.add_child(list, NodeData::new("li", "<li>row</li>"));
        tree.add_child(li, NodeData::new("b", "<b>a</b>"));
        tree.add_child(li, NodeData::new("i", "<i>b</i>"));
    }

    let config = MiningConfig::default();
    let metric = eq_metric();

    let mut index = pica::NodeIndex::new();
    let distances = compute_distances(&tree, &metric, &config, &mut index);
    let region_map = find_data_regions(&tree, &distances, &config).unwrap();
    let regions = region_map.all_sorted();
    let records = extract_records(&tree, &distances, &regions, &config).unwrap();

    let harvest = mine_with_metric(&tree, &metric, &config).unwrap();
    assert_eq!(harvest.regions, regions);
    assert_eq!(harvest.records, records);
    assert_eq!(harvest.index, index);
}

#[test]
fn test_default_metric_pairs_with_high_thresholds() {
    // NormalizedLevenshtein scores identical markup 1.0, so with the default
    // low thresholds identical rows select nothing; raising the region
    // threshold to 1.0 admits them.
    let (mut tree, list) = scaffold("ul");
    for _ in 0..4 {
        tree.add_child(list, NodeData::new("li", "<li>row</li>"));
    }
    assert_eq!(NormalizedLevenshtein.ratio("<li>row</li>", "<li>row</li>"), 1.0);

    let low = mine(&tree, &MiningConfig::default()).unwrap();
    assert!(low.regions.is_empty());

    let config = MiningConfig {
        region_threshold: 1.0,
        ..MiningConfig::default()
    };
    let high = mine(&tree, &config).unwrap();
    assert_eq!(high.regions.len(), 1);
    assert_eq!(high.regions[0].parent, list);
    assert_eq!(high.regions[0].n_nodes_covered, 4);
}
