use scholargraph_core::Table;

/// `groups` publications with `size` authors each.
fn synthetic_links(groups: usize, size: usize) -> Table {
    let mut table = Table::new(
        "author2pub",
        vec!["author_ID".to_string(), "publication_ID".to_string()],
    );
    for g in 0..groups {
        for m in 0..size {
            table.push(vec![Some(format!("A{}", g * 3 + m)), Some(format!("P{g}"))]);
        }
    }
    table
}

#[divan::bench(args = [2, 5, 20])]
fn expand_coauthors(bencher: divan::Bencher, size: usize) {
    let links = synthetic_links(10_000, size);
    bencher.bench(|| scholargraph_core::expand(&links, "publication_ID", "author_ID").unwrap());
}

#[divan::bench(args = [2, 5, 20])]
fn expand_affiliations_unique(bencher: divan::Bencher, size: usize) {
    let links = synthetic_links(10_000, size);
    bencher.bench(|| {
        scholargraph_core::expand_unique(&links, "publication_ID", "author_ID").unwrap()
    });
}

fn main() {
    divan::main();
}
