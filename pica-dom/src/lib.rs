//! DOM-side companion to [`pica`].
//!
//! pica-dom provides:
//! - **Untyped DOM**: simple Element/Node value tree for documents built
//!   programmatically or converted from an external parser
//! - **Canonical serialization**: one deterministic minified form per
//!   subtree, the string the similarity metric compares
//! - **Mining glue**: [`DocTree`] adapts an element tree to the engine and
//!   resolves mined records back to elements
//!
//! # Example
//!
//! ```rust
//! use pica::MiningConfig;
//! use pica_dom::{Element, mine_element_with_metric};
//!
//! fn item() -> Element {
//!     let mut li = Element::new("li");
//!     let mut b = Element::new("b");
//!     b.push_text("name");
//!     let mut i = Element::new("i");
//!     i.push_text("price");
//!     li.push_element(b);
//!     li.push_element(i);
//!     li
//! }
//!
//! // html > body > div > ul, deep enough for the default depth gate.
//! let mut list = Element::new("ul");
//! for _ in 0..4 {
//!     list.push_element(item());
//! }
//! let mut div = Element::new("div");
//! div.push_element(list);
//! let mut body = Element::new("body");
//! body.push_element(div);
//! let mut html = Element::new("html");
//! html.push_element(body);
//!
//! let metric = |a: &str, b: &str| if a == b { 0.0 } else { 1.0 };
//! let (doc, harvest) =
//!     mine_element_with_metric(&html, &metric, &MiningConfig::default()).unwrap();
//!
//! // One record per repeated item, each resolvable back to its <li>.
//! assert_eq!(harvest.records.len(), 4);
//! for record in &harvest.records {
//!     let elements = doc.record_elements(record).unwrap();
//!     assert_eq!(elements[0][0].tag, "li");
//! }
//! ```

pub mod dom;
pub mod mine;
pub mod serialize;

// Re-export the engine for callers that configure or post-process runs.
pub use pica;

pub use dom::{Document, Element, Namespace, Node};
pub use mine::{DocTree, mine_document, mine_element, mine_element_with_metric};
pub use serialize::{serialize_element, serialize_fragment, serialize_node};
