//! Navigation state machine: section/item cursor, submenu stack, breadcrumb.
//!
//! Invariants kept here and nowhere else:
//! - the selection index is always in bounds for the current item list
//!   (vertical movement wraps; an empty list pins it at 0);
//! - breadcrumb length equals submenu depth + 1;
//! - the "active" highlight is force-cleared on pop, immediately, so a
//!   closed submenu can never stay lit until some later repaint.
//!
//! Every transition reports exactly the regions it changed; ordinary
//! navigation never asks for a full repaint.

use crate::input::{Direction, KeyKind};
use crate::menu::{MenuItem, MenuTree};
use crate::render::RegionId;

/// One pushed submenu level: the path from the section root to the item
/// whose children are being browsed, plus the selection inside it.
#[derive(Debug, Clone, PartialEq, Eq)]
struct SubmenuFrame {
    path: Vec<usize>,
    selected: usize,
}

/// What the controller should do after a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavEffect {
    /// Run the handler registered under this key.
    Activate(String),
}

/// Result of feeding one key into the machine.
#[derive(Debug, Default)]
pub struct NavResponse {
    pub dirty: Vec<RegionId>,
    pub effect: Option<NavEffect>,
    /// True on submenu push/pop; the controller flushes the input reader.
    pub context_switched: bool,
}

#[derive(Debug)]
pub struct NavMachine {
    tree: MenuTree,
    section: usize,
    /// Remembered selection per top-level section.
    root_selected: Vec<usize>,
    stack: Vec<SubmenuFrame>,
    breadcrumb: Vec<String>,
    /// Set while a submenu is open; render highlights the breadcrumb tail.
    highlight_active: bool,
}

impl NavMachine {
    pub fn new(tree: MenuTree) -> NavMachine {
        let sections = tree.sections.len();
        let breadcrumb = vec![tree.sections[0].title.clone()];
        NavMachine {
            tree,
            section: 0,
            root_selected: vec![0; sections],
            stack: Vec::new(),
            breadcrumb,
            highlight_active: false,
        }
    }

    pub fn tree(&self) -> &MenuTree {
        &self.tree
    }

    pub fn breadcrumb(&self) -> &[String] {
        &self.breadcrumb
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn highlight_active(&self) -> bool {
        self.highlight_active
    }

    pub fn section_index(&self) -> usize {
        self.section
    }

    /// Items at the current navigation level.
    pub fn current_items(&self) -> &[MenuItem] {
        match self.stack.last() {
            Some(frame) => &self.item_at(&frame.path).items,
            None => &self.tree.sections[self.section].items,
        }
    }

    pub fn selected_index(&self) -> usize {
        match self.stack.last() {
            Some(frame) => frame.selected,
            None => self.root_selected[self.section],
        }
    }

    fn item_at(&self, path: &[usize]) -> &MenuItem {
        let mut item = &self.tree.sections[self.section].items[path[0]];
        for &idx in &path[1..] {
            item = &item.items[idx];
        }
        item
    }

    fn set_selected(&mut self, idx: usize) {
        match self.stack.last_mut() {
            Some(frame) => frame.selected = idx,
            None => self.root_selected[self.section] = idx,
        }
    }

    /// Apply one key event; at most one transition per call.
    pub fn apply(&mut self, key: &KeyKind) -> NavResponse {
        match key {
            KeyKind::Direction(Direction::Up) => self.move_selection(-1),
            KeyKind::Direction(Direction::Down) => self.move_selection(1),
            KeyKind::Direction(Direction::Left) => {
                if self.stack.is_empty() {
                    self.switch_section(-1)
                } else {
                    self.pop()
                }
            }
            KeyKind::Direction(Direction::Right) => {
                if self.stack.is_empty() {
                    self.switch_section(1)
                } else {
                    NavResponse::default()
                }
            }
            KeyKind::Confirm => self.confirm(),
            KeyKind::Cancel => {
                if self.stack.is_empty() {
                    NavResponse::default()
                } else {
                    self.pop()
                }
            }
            _ => NavResponse::default(),
        }
    }

    /// Wrap-around vertical movement: `(index + delta) mod len` by policy,
    /// so holding Down cycles through the list instead of sticking.
    fn move_selection(&mut self, delta: isize) -> NavResponse {
        let len = self.current_items().len();
        if len == 0 {
            return NavResponse::default();
        }
        let current = self.selected_index() as isize;
        let next = (current + delta).rem_euclid(len as isize) as usize;
        if next == current as usize {
            return NavResponse::default();
        }
        self.set_selected(next);
        NavResponse {
            dirty: vec![RegionId::Sidebar],
            ..NavResponse::default()
        }
    }

    fn switch_section(&mut self, delta: isize) -> NavResponse {
        let len = self.tree.sections.len();
        if len < 2 {
            return NavResponse::default();
        }
        self.section = (self.section as isize + delta).rem_euclid(len as isize) as usize;
        self.breadcrumb = vec![self.tree.sections[self.section].title.clone()];
        NavResponse {
            dirty: vec![RegionId::Sidebar, RegionId::Breadcrumb],
            ..NavResponse::default()
        }
    }

    fn confirm(&mut self) -> NavResponse {
        let idx = self.selected_index();
        let Some(item) = self.current_items().get(idx) else {
            return NavResponse::default();
        };
        if !item.enabled {
            return NavResponse::default();
        }
        if item.is_navigable() {
            let label = item.label.clone();
            let mut path = self
                .stack
                .last()
                .map(|frame| frame.path.clone())
                .unwrap_or_default();
            path.push(idx);
            // a fresh frame always starts at the top: no highlight state
            // leaks in from the parent context
            self.stack.push(SubmenuFrame { path, selected: 0 });
            self.breadcrumb.push(label);
            self.highlight_active = true;
            return NavResponse {
                dirty: vec![RegionId::Sidebar, RegionId::Breadcrumb],
                effect: None,
                context_switched: true,
            };
        }
        match &item.handler {
            Some(key) => NavResponse {
                dirty: Vec::new(),
                effect: Some(NavEffect::Activate(key.clone())),
                context_switched: false,
            },
            None => NavResponse::default(),
        }
    }

    /// Leave the current submenu, restoring the parent's remembered
    /// selection and clearing the active highlight right away.
    fn pop(&mut self) -> NavResponse {
        if self.stack.pop().is_none() {
            return NavResponse::default();
        }
        self.breadcrumb.pop();
        self.highlight_active = !self.stack.is_empty();
        NavResponse {
            dirty: vec![RegionId::Sidebar, RegionId::Breadcrumb],
            effect: None,
            context_switched: true,
        }
    }

    /// Snapshot for equality assertions (lock overlay must not disturb us).
    #[cfg(test)]
    fn fingerprint(&self) -> (usize, usize, usize, Vec<String>) {
        (
            self.section,
            self.selected_index(),
            self.depth(),
            self.breadcrumb.clone(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::menu::MenuSection;

    fn leaf(id: &str) -> MenuItem {
        MenuItem {
            id: id.into(),
            label: id.into(),
            icon: String::new(),
            handler: Some(format!("cmd:{id}")),
            enabled: true,
            body: Vec::new(),
            items: Vec::new(),
        }
    }

    fn parent(id: &str, children: Vec<MenuItem>) -> MenuItem {
        MenuItem {
            id: id.into(),
            label: id.into(),
            icon: String::new(),
            handler: None,
            enabled: true,
            body: Vec::new(),
            items: children,
        }
    }

    fn two_sections() -> MenuTree {
        MenuTree {
            sections: vec![
                MenuSection {
                    title: "Alpha".into(),
                    items: vec![leaf("a1"), leaf("a2"), leaf("a3")],
                },
                MenuSection {
                    title: "Beta".into(),
                    items: vec![leaf("b1"), leaf("b2"), leaf("b3")],
                },
            ],
            services: Vec::new(),
        }
    }

    fn nested() -> MenuTree {
        MenuTree {
            sections: vec![MenuSection {
                title: "Root".into(),
                items: vec![
                    parent("ops", vec![leaf("deploy"), leaf("rollback")]),
                    leaf("top"),
                ],
            }],
            services: Vec::new(),
        }
    }

    #[test]
    fn wrap_around_law_holds() {
        // selection after M moves == (initial + M) mod N
        let mut nav = NavMachine::new(two_sections());
        for moves in 1..=7 {
            nav.apply(&KeyKind::Direction(Direction::Down));
            assert_eq!(nav.selected_index(), moves % 3);
        }
        // and upward past the first item lands on the last
        let mut nav = NavMachine::new(two_sections());
        nav.apply(&KeyKind::Direction(Direction::Up));
        assert_eq!(nav.selected_index(), 2);
    }

    #[test]
    fn scenario_a_four_downs_land_on_item_one() {
        let mut nav = NavMachine::new(two_sections());
        for _ in 0..4 {
            nav.apply(&KeyKind::Direction(Direction::Down));
        }
        assert_eq!(nav.selected_index(), (0 + 4) % 3);
        assert_eq!(nav.section_index(), 0);
    }

    #[test]
    fn scenario_b_push_arrows_pop_restores_everything() {
        let mut nav = NavMachine::new(nested());
        let before = nav.fingerprint();

        let push = nav.apply(&KeyKind::Confirm);
        assert!(push.context_switched);
        assert_eq!(nav.breadcrumb(), ["Root", "ops"]);
        assert!(nav.highlight_active());

        for _ in 0..5 {
            nav.apply(&KeyKind::Direction(Direction::Down));
        }

        let pop = nav.apply(&KeyKind::Cancel);
        assert!(pop.context_switched);
        assert_eq!(nav.fingerprint(), before);
        assert!(!nav.highlight_active());
    }

    #[test]
    fn breadcrumb_length_tracks_depth() {
        let tree = MenuTree {
            sections: vec![MenuSection {
                title: "Root".into(),
                items: vec![parent(
                    "l1",
                    vec![parent("l2", vec![leaf("deep")]), leaf("side")],
                )],
            }],
            services: Vec::new(),
        };
        let mut nav = NavMachine::new(tree);
        assert_eq!(nav.breadcrumb().len(), nav.depth() + 1);
        nav.apply(&KeyKind::Confirm);
        assert_eq!(nav.breadcrumb().len(), nav.depth() + 1);
        nav.apply(&KeyKind::Confirm);
        assert_eq!(nav.breadcrumb().len(), nav.depth() + 1);
        nav.apply(&KeyKind::Cancel);
        assert_eq!(nav.breadcrumb().len(), nav.depth() + 1);
        nav.apply(&KeyKind::Cancel);
        assert_eq!(nav.breadcrumb().len(), nav.depth() + 1);
        assert_eq!(nav.depth(), 0);
    }

    #[test]
    fn submenu_push_clears_inherited_selection() {
        let tree = MenuTree {
            sections: vec![MenuSection {
                title: "Root".into(),
                items: vec![
                    leaf("top"),
                    parent("ops", vec![leaf("deploy"), leaf("rollback")]),
                ],
            }],
            services: Vec::new(),
        };
        let mut nav = NavMachine::new(tree);
        // select the parent at index 1, then enter it
        nav.apply(&KeyKind::Direction(Direction::Down));
        nav.apply(&KeyKind::Confirm);
        // the fresh frame starts at the top, not at the parent's index
        assert_eq!(nav.selected_index(), 0);
        // parent's remembered selection is restored on the way out
        nav.apply(&KeyKind::Direction(Direction::Down));
        nav.apply(&KeyKind::Cancel);
        assert_eq!(nav.selected_index(), 1);
    }

    #[test]
    fn left_and_right_cycle_sections_at_root() {
        let mut nav = NavMachine::new(two_sections());
        let resp = nav.apply(&KeyKind::Direction(Direction::Right));
        assert_eq!(nav.section_index(), 1);
        assert_eq!(nav.breadcrumb(), ["Beta"]);
        assert_eq!(resp.dirty, vec![RegionId::Sidebar, RegionId::Breadcrumb]);
        nav.apply(&KeyKind::Direction(Direction::Right));
        assert_eq!(nav.section_index(), 0);
        nav.apply(&KeyKind::Direction(Direction::Left));
        assert_eq!(nav.section_index(), 1);
    }

    #[test]
    fn section_selection_is_remembered_per_section() {
        let mut nav = NavMachine::new(two_sections());
        nav.apply(&KeyKind::Direction(Direction::Down));
        nav.apply(&KeyKind::Direction(Direction::Right));
        assert_eq!(nav.selected_index(), 0);
        nav.apply(&KeyKind::Direction(Direction::Left));
        assert_eq!(nav.selected_index(), 1);
    }

    #[test]
    fn confirm_on_leaf_activates_handler() {
        let mut nav = NavMachine::new(two_sections());
        let resp = nav.apply(&KeyKind::Confirm);
        assert_eq!(resp.effect, Some(NavEffect::Activate("cmd:a1".into())));
        assert!(resp.dirty.is_empty());
    }

    #[test]
    fn disabled_items_do_not_activate() {
        let mut tree = two_sections();
        tree.sections[0].items[0].enabled = false;
        let mut nav = NavMachine::new(tree);
        let resp = nav.apply(&KeyKind::Confirm);
        assert!(resp.effect.is_none());
    }

    #[test]
    fn navigation_never_requests_full_repaint() {
        let mut nav = NavMachine::new(nested());
        let keys = [
            KeyKind::Direction(Direction::Down),
            KeyKind::Confirm,
            KeyKind::Direction(Direction::Down),
            KeyKind::Cancel,
            KeyKind::Direction(Direction::Up),
        ];
        for key in keys {
            let resp = nav.apply(&key);
            assert!(!resp.dirty.contains(&RegionId::Full));
        }
    }
}
