use crate::keywords::{Lexicon, Locative};
use crate::query::token::Token;
use tracing::debug;

/// Pull the target collection name out of the token stream.
///
/// Looks for the first index indicator (索引, 表, index ...). The name is the
/// nearest unclassified token before it, skipping demonstratives, or failing
/// that the token right after it. The indicator, the name, any demonstrative
/// and an adjacent locative (在 ... 中) are removed. Without an indicator the
/// tokens come back untouched.
pub fn extract_index(mut tokens: Vec<Token>, lexicon: &dyn Lexicon) -> (Vec<Token>, Option<String>) {
    let Some(indicator) = tokens
        .iter()
        .position(|t| t.is_unknown() && lexicon.is_index_indicator(&t.text))
    else {
        return (tokens, None);
    };

    let is_name = |t: &Token| t.is_unknown() && !lexicon.is_reserved(&t.text);
    let is_demonstrative = |t: &Token| t.is_unknown() && lexicon.is_demonstrative(&t.text);
    let is_locative = |t: &Token, side: Locative| lexicon.locative(&t.text) == Some(side);

    let mut remove = vec![indicator];

    // Backward, past demonstratives
    let mut name_at = None;
    let mut i = indicator;
    while i > 0 {
        i -= 1;
        if is_demonstrative(&tokens[i]) {
            remove.push(i);
            continue;
        }
        if is_name(&tokens[i]) {
            name_at = Some(i);
        }
        break;
    }

    match name_at {
        Some(name) => {
            let mut j = name;
            while j > 0 && is_demonstrative(&tokens[j - 1]) {
                j -= 1;
                remove.push(j);
            }
            if j > 0 && is_locative(&tokens[j - 1], Locative::Prefix) {
                remove.push(j - 1);
            }
            if tokens
                .get(indicator + 1)
                .is_some_and(|t| t.is_unknown() && is_locative(t, Locative::Suffix))
            {
                remove.push(indicator + 1);
            }
        }
        None => {
            let forward = indicator + 1;
            if tokens.get(forward).is_some_and(is_name) {
                name_at = Some(forward);
                if indicator > 0 && is_locative(&tokens[indicator - 1], Locative::Prefix) {
                    remove.push(indicator - 1);
                }
                if tokens
                    .get(forward + 1)
                    .is_some_and(|t| t.is_unknown() && is_locative(t, Locative::Suffix))
                {
                    remove.push(forward + 1);
                }
            }
        }
    }

    let Some(name_at) = name_at else {
        debug!(indicator = %tokens[indicator].text, "index indicator without a name");
        return (tokens, None);
    };
    remove.push(name_at);

    let name = tokens[name_at].text.clone();
    remove.sort_unstable();
    remove.dedup();
    for idx in remove.into_iter().rev() {
        tokens.remove(idx);
    }

    debug!(index = %name, "index hint extracted");
    (tokens, Some(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keywords::KeywordTables;
    use crate::query::tokenizer::tokenize;

    fn run(input: &str) -> (Vec<String>, Option<String>) {
        let lex = KeywordTables::builtin();
        let (tokens, name) = extract_index(tokenize(input, lex), lex);
        (tokens.into_iter().map(|t| t.text).collect(), name)
    }

    #[test]
    fn test_name_before_indicator_with_locatives() {
        let (rest, name) = run("在orders索引中查询年龄大于18");
        assert_eq!(name.as_deref(), Some("orders"));
        assert_eq!(rest, vec!["年龄", "大于", "18"]);
    }

    #[test]
    fn test_name_after_indicator() {
        let (rest, name) = run("index logs level is error");
        assert_eq!(name.as_deref(), Some("logs"));
        assert_eq!(rest, vec!["level", "is", "error"]);
    }

    #[test]
    fn test_demonstrative_skipped() {
        let (rest, name) = run("from users this table where age > 3");
        assert_eq!(name.as_deref(), Some("users"));
        assert_eq!(rest, vec!["age", ">", "3"]);
    }

    #[test]
    fn test_no_indicator_leaves_tokens() {
        let (rest, name) = run("年龄大于18");
        assert!(name.is_none());
        assert_eq!(rest, vec!["年龄", "大于", "18"]);
    }

    #[test]
    fn test_only_first_indicator_used() {
        let (rest, name) = run("a表 b表");
        assert_eq!(name.as_deref(), Some("a"));
        assert_eq!(rest, vec!["b", "表"]);
    }

    #[test]
    fn test_fake_lexicon() {
        let mut lex = KeywordTables::empty();
        lex.entry_mut("仓库").index_indicator = true;
        let tokens = tokenize("北方仓库", &lex);
        let (rest, name) = extract_index(tokens, &lex);
        assert_eq!(name.as_deref(), Some("北方"));
        assert!(rest.is_empty());
    }
}
