//! CSS post-processing via lightningcss.
//!
//! Runs on the parsed rule tree, in order:
//!
//! 1. `size: W [H]` expands to `width` and `height`
//! 2. top-level `@media` blocks with the same query are packed into one,
//!    moved after the plain rules and sorted by ascending `min-width`
//! 3. vendor prefixing for the configured browser targets, rule merging
//!    and minification

use std::sync::LazyLock;

use lightningcss::properties::Property;
use lightningcss::properties::custom::{CustomPropertyName, Token, TokenOrValue};
use lightningcss::properties::size::Size;
use lightningcss::rules::media::MediaRule;
use lightningcss::rules::{CssRule, CssRuleList};
use lightningcss::stylesheet::{MinifyOptions, ParserOptions, PrinterOptions, StyleSheet};
use lightningcss::targets::{Browsers, Targets};
use lightningcss::traits::ToCss;
use lightningcss::values::length::{LengthPercentage, LengthValue};
use lightningcss::values::percentage::Percentage;
use regex::Regex;

use super::{Document, Stage};
use crate::config::section::BrowserTargets;
use crate::pipeline::BuildError;

#[derive(Debug, Clone, Copy)]
pub struct PostProcess {
    targets: Targets,
    minify: bool,
}

impl PostProcess {
    pub fn new(browsers: &BrowserTargets, minify: bool) -> Self {
        Self {
            targets: Targets {
                browsers: Some(to_browsers(browsers)),
                ..Targets::default()
            },
            minify,
        }
    }
}

/// lightningcss encodes versions as `major << 16 | minor << 8 | patch`.
fn to_browsers(targets: &BrowserTargets) -> Browsers {
    let version = |major: Option<u32>| major.map(|v| v << 16);
    Browsers {
        android: version(targets.android),
        chrome: version(targets.chrome),
        edge: version(targets.edge),
        firefox: version(targets.firefox),
        ie: version(targets.ie),
        ios_saf: version(targets.ios_saf),
        opera: version(targets.opera),
        safari: version(targets.safari),
        samsung: version(targets.samsung),
    }
}

impl Stage for PostProcess {
    fn name(&self) -> &'static str {
        "postcss"
    }

    fn apply(&self, doc: Document) -> Result<Document, BuildError> {
        let filename = doc.source.to_string_lossy().into_owned();
        let code = {
            let text = doc.text()?;
            let mut sheet = StyleSheet::parse(
                text,
                ParserOptions {
                    filename,
                    ..ParserOptions::default()
                },
            )
            .map_err(|e| BuildError::compile(&doc.source, e))?;

            expand_size(&mut sheet.rules);
            pack_media(&mut sheet.rules);
            sheet
                .minify(MinifyOptions {
                    targets: self.targets,
                    ..MinifyOptions::default()
                })
                .map_err(|e| BuildError::compile(&doc.source, e))?;

            sheet
                .to_css(PrinterOptions {
                    minify: self.minify,
                    targets: self.targets,
                    ..PrinterOptions::default()
                })
                .map_err(|e| BuildError::compile(&doc.source, e))?
                .code
        };
        Ok(doc.with_text(code))
    }
}

// ============================================================================
// size shorthand
// ============================================================================

fn expand_size<R>(rules: &mut CssRuleList<'_, R>) {
    for rule in rules.0.iter_mut() {
        match rule {
            CssRule::Style(style) => {
                expand_declarations(&mut style.declarations.declarations);
                expand_declarations(&mut style.declarations.important_declarations);
                expand_size(&mut style.rules);
            }
            CssRule::Media(media) => expand_size(&mut media.rules),
            CssRule::Supports(supports) => expand_size(&mut supports.rules),
            _ => {}
        }
    }
}

fn expand_declarations(declarations: &mut Vec<Property<'_>>) {
    if !declarations.iter().any(|p| size_shorthand(p).is_some()) {
        return;
    }
    let mut expanded = Vec::with_capacity(declarations.len() + 1);
    for property in declarations.drain(..) {
        match size_shorthand(&property) {
            Some((width, height)) => {
                expanded.push(Property::Width(width));
                expanded.push(Property::Height(height));
            }
            None => expanded.push(property),
        }
    }
    *declarations = expanded;
}

/// `size` is not a CSS property, so it arrives as an unknown custom one.
/// Values other than one or two lengths, percentages or `auto` are left
/// alone.
fn size_shorthand(property: &Property<'_>) -> Option<(Size, Size)> {
    let Property::Custom(custom) = property else {
        return None;
    };
    let CustomPropertyName::Unknown(name) = &custom.name else {
        return None;
    };
    if !name.0.eq_ignore_ascii_case("size") {
        return None;
    }

    let values = custom
        .value
        .0
        .iter()
        .filter(|token| !matches!(token, TokenOrValue::Token(Token::WhiteSpace(_))))
        .map(to_size)
        .collect::<Option<Vec<_>>>()?;
    match values.as_slice() {
        [both] => Some((both.clone(), both.clone())),
        [width, height] => Some((width.clone(), height.clone())),
        _ => None,
    }
}

fn to_size(token: &TokenOrValue<'_>) -> Option<Size> {
    let length = match token {
        TokenOrValue::Length(length) => LengthPercentage::Dimension(length.clone()),
        TokenOrValue::Token(Token::Percentage { unit_value, .. }) => {
            LengthPercentage::Percentage(Percentage(*unit_value))
        }
        TokenOrValue::Token(Token::Number { value, .. }) if *value == 0.0 => {
            LengthPercentage::Dimension(LengthValue::Px(0.0))
        }
        TokenOrValue::Token(Token::Ident(ident)) if ident.eq_ignore_ascii_case("auto") => {
            return Some(Size::Auto);
        }
        _ => return None,
    };
    Some(Size::LengthPercentage(length))
}

// ============================================================================
// media query packing
// ============================================================================

fn pack_media<'i, R>(rules: &mut CssRuleList<'i, R>) {
    let mut plain = Vec::with_capacity(rules.0.len());
    let mut packed: Vec<(String, MediaRule<'i, R>)> = Vec::new();

    for rule in rules.0.drain(..) {
        let CssRule::Media(media) = rule else {
            plain.push(rule);
            continue;
        };
        let Ok(query) = media.query.to_css_string(PrinterOptions::default()) else {
            plain.push(CssRule::Media(media));
            continue;
        };
        match packed.iter_mut().find(|(key, _)| *key == query) {
            Some((_, first)) => first.rules.0.extend(media.rules.0),
            None => packed.push((query, media)),
        }
    }

    // Stable: equal keys keep source order
    packed.sort_by(|(a, _), (b, _)| min_width(a).total_cmp(&min_width(b)));
    plain.extend(packed.into_iter().map(|(_, media)| CssRule::Media(media)));
    rules.0 = plain;
}

/// Smallest `min-width` of a serialized query in px, 0 when absent.
fn min_width(query: &str) -> f64 {
    static RE_MIN_WIDTH: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"(?:min-width:|width *>=?) *([0-9.]+)(px|em|rem)?").unwrap()
    });

    RE_MIN_WIDTH
        .captures_iter(query)
        .filter_map(|caps| {
            let value: f64 = caps[1].parse().ok()?;
            match caps.get(2).map(|m| m.as_str()) {
                Some("em" | "rem") => Some(value * 16.0),
                _ => Some(value),
            }
        })
        .fold(None, |min: Option<f64>, v| Some(min.map_or(v, |m| m.min(v))))
        .unwrap_or(0.0)
}
