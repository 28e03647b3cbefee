use std::ops::Range;

pub const DEFAULT_ITEMS_PER_PAGE: usize = 5;
pub const DEFAULT_GROUP_SIZE: usize = 10;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControlKind {
    First,
    PreviousGroup,
    Page(usize),
    NextGroup,
    Last,
}

impl ControlKind {
    pub fn label(&self) -> String {
        match self {
            Self::First => "<<".to_string(),
            Self::PreviousGroup => "<".to_string(),
            Self::Page(n) => n.to_string(),
            Self::NextGroup => ">".to_string(),
            Self::Last => ">>".to_string(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageControl {
    pub kind: ControlKind,
    /// Page this control navigates to.
    pub target: usize,
    pub disabled: bool,
    pub active: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PagePlan {
    pub slice: Range<usize>,
    pub total_pages: usize,
    pub group_start: usize,
    pub group_end: usize,
    pub controls: Vec<PageControl>,
}

impl PagePlan {
    pub fn control(&self, kind: ControlKind) -> Option<&PageControl> {
        self.controls.iter().find(|c| c.kind == kind)
    }
}

/// Computes the visible slice and the windowed page controls.
///
/// `current_page` is 1-based and is expected to be within
/// `1..=total_pages`; callers reset it to 1 whenever the result set changes.
/// Out-of-range pages are not clamped: the slice comes back empty and the
/// group window may be degenerate (`group_start > group_end`). With a
/// single page the slice covers every item on page 1 and nothing after it.
pub fn plan(
    total_items: usize,
    current_page: usize,
    items_per_page: usize,
    group_size: usize,
) -> PagePlan {
    let items_per_page = items_per_page.max(1);
    let group_size = group_size.max(1);
    let current_page = current_page.max(1);

    let start = (current_page - 1)
        .saturating_mul(items_per_page)
        .min(total_items);
    let end = current_page.saturating_mul(items_per_page).min(total_items);

    let total_pages = total_items.div_ceil(items_per_page);
    if total_pages <= 1 {
        return PagePlan {
            slice: start..end,
            total_pages,
            group_start: 1,
            group_end: total_pages,
            controls: Vec::new(),
        };
    }

    let group_start = (current_page - 1) / group_size * group_size + 1;
    let group_end = group_start
        .saturating_add(group_size - 1)
        .min(total_pages);

    let window = group_end.saturating_add(1).saturating_sub(group_start);
    let mut controls = Vec::with_capacity(window + 4);
    controls.push(PageControl {
        kind: ControlKind::First,
        target: 1,
        disabled: current_page == 1,
        active: false,
    });
    controls.push(PageControl {
        kind: ControlKind::PreviousGroup,
        target: group_start.saturating_sub(1),
        disabled: group_start == 1,
        active: false,
    });
    for page in group_start..=group_end {
        controls.push(PageControl {
            kind: ControlKind::Page(page),
            target: page,
            disabled: false,
            active: page == current_page,
        });
    }
    controls.push(PageControl {
        kind: ControlKind::NextGroup,
        target: group_end.saturating_add(1),
        disabled: group_end >= total_pages,
        active: false,
    });
    controls.push(PageControl {
        kind: ControlKind::Last,
        target: total_pages,
        disabled: current_page == total_pages,
        active: false,
    });

    PagePlan {
        slice: start..end,
        total_pages,
        group_start,
        group_end,
        controls,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page_numbers(p: &PagePlan) -> Vec<usize> {
        p.controls
            .iter()
            .filter_map(|c| match c.kind {
                ControlKind::Page(n) => Some(n),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn single_page_has_no_controls() {
        let p = plan(5, 1, 5, 10);
        assert_eq!(p.total_pages, 1);
        assert_eq!(p.slice, 0..5);
        assert!(p.controls.is_empty());

        let p = plan(0, 1, 5, 10);
        assert_eq!(p.total_pages, 0);
        assert_eq!(p.slice, 0..0);
        assert!(p.controls.is_empty());

        let p = plan(2, 2, 5, 10);
        assert!(p.slice.is_empty());
        assert!(p.controls.is_empty());
    }

    #[test]
    fn first_page_of_many() {
        let p = plan(47, 1, 5, 10);
        assert_eq!(p.total_pages, 10);
        assert_eq!(p.slice, 0..5);
        assert_eq!(page_numbers(&p), (1..=10).collect::<Vec<_>>());
        assert!(p.control(ControlKind::First).unwrap().disabled);
        assert!(p.control(ControlKind::PreviousGroup).unwrap().disabled);
        assert!(p.control(ControlKind::NextGroup).unwrap().disabled);
        assert!(!p.control(ControlKind::Last).unwrap().disabled);
        assert!(p.control(ControlKind::Page(1)).unwrap().active);
    }

    #[test]
    fn last_page_slice_is_clamped() {
        let p = plan(47, 10, 5, 10);
        assert_eq!(p.slice, 45..47);
        assert!(p.control(ControlKind::Last).unwrap().disabled);
        assert!(!p.control(ControlKind::First).unwrap().disabled);
    }

    #[test]
    fn groups_window_the_page_numbers() {
        // 23 pages, page 14 lives in the second group
        let p = plan(115, 14, 5, 10);
        assert_eq!(p.total_pages, 23);
        assert_eq!((p.group_start, p.group_end), (11, 20));
        assert_eq!(page_numbers(&p), (11..=20).collect::<Vec<_>>());
        let prev = p.control(ControlKind::PreviousGroup).unwrap();
        assert!(!prev.disabled);
        assert_eq!(prev.target, 10);
        let next = p.control(ControlKind::NextGroup).unwrap();
        assert!(!next.disabled);
        assert_eq!(next.target, 21);
        assert_eq!(p.control(ControlKind::Last).unwrap().target, 23);

        let p = plan(115, 21, 5, 10);
        assert_eq!((p.group_start, p.group_end), (21, 23));
        assert!(p.control(ControlKind::NextGroup).unwrap().disabled);
    }

    #[test]
    fn controls_are_emitted_in_order() {
        let p = plan(20, 2, 5, 10);
        let kinds: Vec<ControlKind> = p.controls.iter().map(|c| c.kind).collect();
        assert_eq!(
            kinds,
            vec![
                ControlKind::First,
                ControlKind::PreviousGroup,
                ControlKind::Page(1),
                ControlKind::Page(2),
                ControlKind::Page(3),
                ControlKind::Page(4),
                ControlKind::NextGroup,
                ControlKind::Last,
            ]
        );
    }

    #[test]
    fn page_past_the_end_is_not_clamped() {
        let p = plan(47, 12, 5, 10);
        assert_eq!(p.total_pages, 10);
        assert_eq!((p.group_start, p.group_end), (11, 10));
        assert!(page_numbers(&p).is_empty());
        assert_eq!(p.slice, 47..47);
        assert!(p.control(ControlKind::NextGroup).unwrap().disabled);
        assert!(!p.control(ControlKind::Last).unwrap().disabled);
    }

    #[test]
    fn huge_page_number_yields_empty_slice() {
        let p = plan(47, usize::MAX / 2, 5, 10);
        assert_eq!(p.total_pages, 10);
        assert_eq!(p.slice, 47..47);
        assert!(page_numbers(&p).is_empty());

        let p = plan(47, usize::MAX, usize::MAX, 10);
        assert_eq!(p.slice, 47..47);
    }

    #[test]
    fn huge_group_size_windows_all_pages() {
        let p = plan(47, 1, 5, 1_000_000_000_000);
        assert_eq!((p.group_start, p.group_end), (1, 10));
        assert_eq!(page_numbers(&p), (1..=10).collect::<Vec<_>>());
        assert_eq!(p.controls.len(), 14);

        let p = plan(47, 3, 5, usize::MAX);
        assert_eq!((p.group_start, p.group_end), (1, 10));
        assert!(p.control(ControlKind::NextGroup).unwrap().disabled);
    }
}
