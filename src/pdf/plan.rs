//! Output page planning
//!
//! The template has a fixed structure: a front page, a chart page, an
//! optional continuation page (3) and fixed back matter (4+). Which pages
//! survive, and what is drawn on them, is decided here without touching any
//! PDF.

use crate::error::{Error, Result};

/// Charts needed before the continuation page is kept
pub const CONTINUATION_CHART_THRESHOLD: usize = 2;

/// Template page index (0-based) of the continuation page
const CONTINUATION_PAGE: usize = 2;

/// Where one output page comes from (all indices 0-based)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageSource {
    /// Template page with an overlay page drawn on top
    Composite { template: usize, overlay: usize },
    /// Overlay page on a blank page, the template being too short
    OverlayOnly { overlay: usize },
    /// Template page copied unchanged
    Template { template: usize },
}

/// Ordered output pages for one record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagePlan {
    /// Whether the overlay continuation page is part of the output
    pub include_overlay_page3: bool,
    pub pages: Vec<PageSource>,
}

impl PagePlan {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

/// Decide the output pages for a record.
///
/// * `chart_count` - chart files found for the record
/// * `overlay_pages` - pages produced by the composer
/// * `template_pages` - pages in the template
///
/// The template's continuation page is dropped entirely unless more than
/// two charts exist; back matter after it is always kept.
pub fn page_plan(
    chart_count: usize,
    overlay_pages: usize,
    template_pages: usize,
) -> Result<PagePlan> {
    if template_pages == 0 {
        return Err(Error::TemplateMissingPage {
            page: 1,
            total: template_pages,
        });
    }

    let mut pages = vec![PageSource::Composite {
        template: 0,
        overlay: 0,
    }];

    if template_pages > 1 {
        pages.push(if overlay_pages > 1 {
            PageSource::Composite {
                template: 1,
                overlay: 1,
            }
        } else {
            PageSource::Template { template: 1 }
        });
    }

    let include_overlay_page3 =
        chart_count > CONTINUATION_CHART_THRESHOLD && overlay_pages > CONTINUATION_PAGE;

    if include_overlay_page3 {
        pages.push(if template_pages > CONTINUATION_PAGE {
            PageSource::Composite {
                template: CONTINUATION_PAGE,
                overlay: CONTINUATION_PAGE,
            }
        } else {
            PageSource::OverlayOnly {
                overlay: CONTINUATION_PAGE,
            }
        });
    }

    pages.extend(
        (CONTINUATION_PAGE + 1..template_pages).map(|template| PageSource::Template { template }),
    );

    Ok(PagePlan {
        include_overlay_page3,
        pages,
    })
}
