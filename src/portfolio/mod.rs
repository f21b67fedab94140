//! The public portfolio pages.

mod detail;
mod home;

use maud::{Markup, html};

use crate::{
    html::{TAG_BADGE_STYLE, stored_text},
    tag::Tag,
};

pub use detail::{get_article_page, get_project_page};
pub use home::{ContactNotice, contact_form, get_home_page, get_more_content};

fn tag_badges(tags: &[Tag]) -> Markup {
    html! {
        @if !tags.is_empty() {
            ul class="mt-2 flex flex-wrap gap-2"
            {
                @for tag in tags {
                    li class=(TAG_BADGE_STYLE) data-tag=(tag.slug) { (stored_text(&tag.name)) }
                }
            }
        }
    }
}
