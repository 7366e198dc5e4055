use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;

/// Something that can be shown and filtered in a picker list
pub trait Candidate {
    fn label(&self) -> &str;
}

/// A visible row: index into the full item list plus matched char positions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    pub index: usize,
    pub indices: Vec<usize>,
}

/// Candidate list narrowed by a typed filter, with a cursor over the
/// filtered rows.
pub struct FilterList<T> {
    items: Vec<T>,
    filter: String,
    visible: Vec<Match>,
    cursor: usize,
    matcher: SkimMatcherV2,
}

impl<T: Candidate> Default for FilterList<T> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl<T: Candidate> FilterList<T> {
    pub fn new(items: Vec<T>) -> Self {
        let mut list = Self {
            items,
            filter: String::new(),
            visible: Vec::new(),
            cursor: 0,
            matcher: SkimMatcherV2::default().ignore_case(),
        };
        list.refilter();
        list
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn visible_len(&self) -> usize {
        self.visible.len()
    }

    /// Visible rows paired with their items, in display order
    pub fn visible(&self) -> impl Iterator<Item = (&T, &Match)> {
        self.visible.iter().map(|m| (&self.items[m.index], m))
    }

    /// The highlighted item among the filtered rows
    pub fn selected(&self) -> Option<&T> {
        self.visible.get(self.cursor).map(|m| &self.items[m.index])
    }

    pub fn push_char(&mut self, c: char) {
        self.filter.push(c);
        self.refilter();
    }

    pub fn pop_char(&mut self) {
        if self.filter.pop().is_some() {
            self.refilter();
        }
    }

    pub fn clear_filter(&mut self) {
        if !self.filter.is_empty() {
            self.filter.clear();
            self.refilter();
        }
    }

    pub fn move_up(&mut self, n: usize) {
        self.cursor = self.cursor.saturating_sub(n);
    }

    pub fn move_down(&mut self, n: usize) {
        let last = self.visible.len().saturating_sub(1);
        self.cursor = (self.cursor + n).min(last);
    }

    pub fn move_to_start(&mut self) {
        self.cursor = 0;
    }

    pub fn move_to_end(&mut self) {
        self.cursor = self.visible.len().saturating_sub(1);
    }

    /// Put the cursor on the row labelled `label`, if visible
    pub fn select_label(&mut self, label: &str) -> bool {
        match self
            .visible
            .iter()
            .position(|m| self.items[m.index].label() == label)
        {
            Some(pos) => {
                self.cursor = pos;
                true
            }
            None => false,
        }
    }

    fn refilter(&mut self) {
        self.cursor = 0;

        if self.filter.is_empty() {
            self.visible = (0..self.items.len())
                .map(|index| Match {
                    index,
                    indices: Vec::new(),
                })
                .collect();
            return;
        }

        let mut scored: Vec<(i64, Match)> = self
            .items
            .iter()
            .enumerate()
            .filter_map(|(index, item)| {
                self.matcher
                    .fuzzy_indices(item.label(), &self.filter)
                    .map(|(score, indices)| (score, Match { index, indices }))
            })
            .collect();

        // Stable sort keeps the original order among equal scores
        scored.sort_by(|a, b| b.0.cmp(&a.0));
        self.visible = scored.into_iter().map(|(_, m)| m).collect();
    }
}
