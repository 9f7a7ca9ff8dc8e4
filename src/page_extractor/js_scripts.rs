//! Selectors and in-page scripts for the photo viewer.
//!
//! The selectors are tied to one site's DOM; when the site changes its
//! markup, this file is the only place that needs updating.

/// "Next photo" control in the viewer overlay.
pub const NEXT_PHOTO_SELECTOR: &str = r#"[aria-label="Next photo"]"#;

/// "See more" disclosure inside the caption side panel.
pub const READ_MORE_SELECTOR: &str = r#"[role="complementary"] span [role="button"]"#;

/// The full-size image element.
pub const PHOTO_IMG_SELECTOR: &str = r#"img[data-visualcompletion="media-vc-image"]"#;

/// Caption text container in the side panel.
pub const CAPTION_SELECTOR: &str =
    r#"[role="complementary"] div.xyinxu5.x4uap5.x1g2khh7.xkhd6sd > span"#;

/// Expand the caption if it is collapsed.
///
/// The disclosure control also exists in expanded state, where it wraps an
/// icon image instead of text; clicking it then would collapse the caption
/// again. Evaluates to whether the control exists at all.
pub const READ_MORE_SCRIPT: &str = r#"
    (() => {
        const btn = document.querySelector('[role="complementary"] span [role="button"]');
        if (btn && !btn.innerHTML.includes('img')) {
            btn.click();
        }
        return Boolean(btn);
    })()
"#;

/// Read the image source and caption text.
///
/// Evaluates to `{ imageUrl, caption }`; either may be empty while the
/// viewer is still rendering.
pub const PHOTO_INFO_SCRIPT: &str = r#"
    (() => {
        const img = document.querySelector('img[data-visualcompletion="media-vc-image"]');
        const caption = document.querySelector('[role="complementary"] div.xyinxu5.x4uap5.x1g2khh7.xkhd6sd > span');
        return {
            imageUrl: (img && img.src) || '',
            caption: (caption && caption.innerText) || ''
        };
    })()
"#;
