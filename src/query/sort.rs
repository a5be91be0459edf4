use crate::intent::SortIntent;
use crate::keywords::Lexicon;
use crate::query::token::{Token, TokenKind};
use tracing::debug;

/// Max field fragments merged before a sort word
const SORT_WINDOW: usize = 6;

/// One sort key per sort word, in the order written.
///
/// The field is the run of unclassified tokens right before the word, cut at
/// any classified token or a boundary word like 按 / order by. A bare 排序
/// next to an explicit 升序/降序 is only filler and yields nothing.
pub fn parse_sorts(tokens: &[Token], lexicon: &dyn Lexicon) -> Vec<SortIntent> {
    let mut sorts = Vec::new();

    for (i, token) in tokens.iter().enumerate() {
        let TokenKind::Sort { order, explicit } = token.kind else {
            continue;
        };
        let beside_order = i.checked_sub(1).is_some_and(|p| is_explicit_sort(tokens, p))
            || is_explicit_sort(tokens, i + 1);
        if !explicit && beside_order {
            continue;
        }

        let mut start = i;
        while start > 0 && i - start < SORT_WINDOW {
            let prev = &tokens[start - 1];
            if !prev.is_unknown() || lexicon.is_reserved(&prev.text) {
                break;
            }
            start -= 1;
        }

        if start == i {
            debug!(word = %token.text, "sort word without a field");
            continue;
        }

        let field_hint: String = tokens[start..i].iter().map(|t| t.text.as_str()).collect();
        sorts.push(SortIntent { field_hint, order });
    }

    sorts
}

fn is_explicit_sort(tokens: &[Token], i: usize) -> bool {
    matches!(tokens.get(i).map(|t| &t.kind), Some(TokenKind::Sort { explicit: true, .. }))
}
