use force_graph::DefaultNodeIdx;

/// What a node click reports to the page.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NodeDetails {
	pub id: String,
	pub cluster: String,
	pub name: Option<String>,
	pub description: Option<String>,
}

impl NodeDetails {
	/// Panel title: the display name, or the id when there is none.
	pub fn title(&self) -> &str {
		self.name.as_deref().unwrap_or(&self.id)
	}
}

/// Outcome of a press/release pair that did not move.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Click {
	Node(DefaultNodeIdx),
	Background,
}
