//! Target property graph: five node types and ten relationship types

use scholargraph_core::{Namespace, NodeColumn, NodeSchema, RelationshipSchema};

pub const VENUE: NodeSchema = NodeSchema {
    label: "Venue",
    file_stem: "venues",
    columns: &[
        NodeColumn::id("venue_ID", Namespace::Venue),
        NodeColumn::string("full_name"),
        NodeColumn::int("h_index_calculated"),
    ],
};

pub const AUTHOR: NodeSchema = NodeSchema {
    label: "Author",
    file_stem: "authors",
    columns: &[
        NodeColumn::id("author_ID", Namespace::Author),
        NodeColumn::string("full_name"),
        NodeColumn::int("h_index_real"),
        NodeColumn::int("h_index_calculated"),
    ],
};

pub const AFFILIATION: NodeSchema = NodeSchema {
    label: "Affiliation",
    file_stem: "affiliations",
    columns: &[
        NodeColumn::id("affiliation_ID", Namespace::Affiliation),
        NodeColumn::string("name"),
        NodeColumn::string("place"),
    ],
};

pub const PUBLICATION: NodeSchema = NodeSchema {
    label: "Publication",
    file_stem: "publications",
    columns: &[
        NodeColumn::id("publication_ID", Namespace::Publication),
        NodeColumn::string("title"),
        NodeColumn::string("doi"),
        NodeColumn::int("year"),
        NodeColumn::string("venue"),
    ],
};

pub const DOMAIN: NodeSchema = NodeSchema {
    label: "ScientificDomain",
    file_stem: "domains",
    columns: &[
        NodeColumn::id("arxiv_category", Namespace::ArxivCategory),
        NodeColumn::string("major_field"),
        NodeColumn::string("sub_category"),
        NodeColumn::string("exact_category"),
    ],
};

/// Node types in emission order.
pub const NODES: [NodeSchema; 5] = [VENUE, AUTHOR, AFFILIATION, PUBLICATION, DOMAIN];

const fn rel(
    rel_type: &'static str,
    file_stem: &'static str,
    start: Namespace,
    end: Namespace,
    dedup: bool,
) -> RelationshipSchema {
    RelationshipSchema {
        rel_type,
        file_stem,
        start,
        end,
        dedup,
    }
}

pub const AUTHOR_OF: RelationshipSchema = rel(
    "AUTHOR_OF",
    "author_of",
    Namespace::Author,
    Namespace::Publication,
    false,
);

/// Repeated pairs are kept: one per shared publication.
pub const AUTHOR_COLLABORATES_WITH: RelationshipSchema = rel(
    "COLLABORATES_WITH",
    "author_collaborates_with",
    Namespace::Author,
    Namespace::Author,
    false,
);

pub const WORKS_AT: RelationshipSchema = rel(
    "WORKS_AT",
    "works_at",
    Namespace::Author,
    Namespace::Affiliation,
    false,
);

pub const PUBLISHED_IN: RelationshipSchema = rel(
    "PUBLISHED_IN",
    "published_in",
    Namespace::Publication,
    Namespace::Venue,
    false,
);

pub const BELONGS_TO: RelationshipSchema = rel(
    "BELONGS_TO",
    "belongs_to",
    Namespace::Publication,
    Namespace::ArxivCategory,
    false,
);

/// Start is the cited publication, end the citing one.
pub const CITED_BY: RelationshipSchema = rel(
    "CITED_BY",
    "cited_by",
    Namespace::Publication,
    Namespace::Publication,
    false,
);

pub const COVERS: RelationshipSchema = rel(
    "COVERS",
    "covers",
    Namespace::Affiliation,
    Namespace::ArxivCategory,
    true,
);

pub const AFFILIATION_COLLABORATES_WITH: RelationshipSchema = rel(
    "COLLABORATES_WITH",
    "affiliation_collaborates_with",
    Namespace::Affiliation,
    Namespace::Affiliation,
    true,
);

pub const PUBLISHES_IN: RelationshipSchema = rel(
    "PUBLISHES_IN",
    "affiliation_publishes_in",
    Namespace::Affiliation,
    Namespace::Venue,
    true,
);

pub const PUBLISHES_AT: RelationshipSchema = rel(
    "PUBLISHES_AT",
    "author_publishes_at",
    Namespace::Author,
    Namespace::Venue,
    true,
);

/// Relationship types in emission order.
pub const RELATIONSHIPS: [RelationshipSchema; 10] = [
    AUTHOR_OF,
    AUTHOR_COLLABORATES_WITH,
    WORKS_AT,
    PUBLISHED_IN,
    BELONGS_TO,
    CITED_BY,
    COVERS,
    AFFILIATION_COLLABORATES_WITH,
    PUBLISHES_IN,
    PUBLISHES_AT,
];
