//! Classification of language-bearing blocks.
//!
//! A block bears a language when it is a fenced code block whose info string
//! starts with a language identifier (`{python}`, `r`, `{=html}`), or a display
//! math block. Indented code never bears a language.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::languages::LanguageRegistry;
use crate::tokenizer::{Token, TokenKind};
use crate::types::Position;

/// Language name reported for display math blocks.
pub const MATH_LANGUAGE: &str = "tex";

static LANGUAGE_INFO: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\{?=?[A-Za-z0-9_]+").expect("valid language regex"));

pub fn is_fenced_code(token: &Token) -> bool {
    token.kind == TokenKind::FencedCode
}

pub fn is_display_math(token: &Token) -> bool {
    token.kind == TokenKind::DisplayMath
}

pub fn is_executable_language_block(token: &Token) -> bool {
    (is_fenced_code(token) && LANGUAGE_INFO.is_match(token.info.trim())) || is_display_math(token)
}

/// The language a block declares.
///
/// Leading non-word characters are stripped from the info string and the
/// leading word is taken, so `{python}`, `{r, echo=FALSE}` and `{=html}` yield
/// `python`, `r` and `html`.
pub fn language_name_from_block(token: &Token) -> Option<String> {
    if is_display_math(token) {
        return Some(MATH_LANGUAGE.to_string());
    }
    let name: String = token
        .info
        .trim_start_matches(|c: char| !is_word_char(c))
        .chars()
        .take_while(|c| is_word_char(*c))
        .collect();
    (!name.is_empty()).then_some(name)
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// The first language block whose body contains `pos`.
///
/// Fence lines are not part of the body, so positions on either fence line
/// match nothing.
pub fn block_at_position(tokens: &[Token], pos: Position) -> Option<&Token> {
    let line = pos.line as usize;
    tokens
        .iter()
        .filter(|token| is_executable_language_block(token))
        .find(|token| token.body.contains(line))
}

pub fn language_at_position(tokens: &[Token], pos: Position) -> Option<String> {
    block_at_position(tokens, pos).and_then(language_name_from_block)
}

/// All language blocks whose declared name resolves, through the registry's
/// aliases, to the canonical `language`. In document order.
pub fn blocks_of_language<'a>(
    tokens: &'a [Token],
    registry: &'a LanguageRegistry,
    language: &'a str,
) -> impl Iterator<Item = &'a Token> + 'a {
    tokens.iter().filter(move |token| {
        is_executable_language_block(token)
            && language_name_from_block(token)
                .and_then(|name| registry.get(&name))
                .is_some_and(|found| found.name == language)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::{LineRange, Tokenizer};

    fn fence(info: &str) -> Token {
        Token {
            kind: TokenKind::FencedCode,
            lines: LineRange::new(0, 3),
            body: LineRange::new(1, 2),
            info: info.to_string(),
            content: "x\n".to_string(),
        }
    }

    #[test]
    fn language_names() {
        assert_eq!(
            language_name_from_block(&fence("{python}")).as_deref(),
            Some("python")
        );
        assert_eq!(
            language_name_from_block(&fence("{r, echo=FALSE}")).as_deref(),
            Some("r")
        );
        assert_eq!(
            language_name_from_block(&fence("{=html}")).as_deref(),
            Some("html")
        );
        assert_eq!(language_name_from_block(&fence("sql")).as_deref(), Some("sql"));
        assert_eq!(language_name_from_block(&fence("")), None);
    }

    #[test]
    fn executable_blocks() {
        assert!(is_executable_language_block(&fence("{python}")));
        assert!(is_executable_language_block(&fence("r")));
        assert!(!is_executable_language_block(&fence("")));
        assert!(!is_executable_language_block(&fence("{.python}")));

        let mut indented = fence("python");
        indented.kind = TokenKind::IndentedCode;
        assert!(!is_executable_language_block(&indented));
    }

    #[test]
    fn math_is_tex() {
        let tokens = Tokenizer::new().tokenize("$$\n\\alpha\n$$\n");
        assert!(is_display_math(&tokens[0]));
        assert!(is_executable_language_block(&tokens[0]));
        assert_eq!(
            language_at_position(&tokens, Position::new(1, 0)).as_deref(),
            Some(MATH_LANGUAGE)
        );
    }

    #[test]
    fn fence_lines_are_excluded() {
        // lines: 0 title, 1 blank, 2 fence, 3 body, 4 fence
        let tokens = Tokenizer::new().tokenize("# Title\n\n```{r}\nsummary(x)\n```");

        assert_eq!(language_at_position(&tokens, Position::new(1, 0)), None);
        assert_eq!(language_at_position(&tokens, Position::new(2, 3)), None);
        assert_eq!(
            language_at_position(&tokens, Position::new(3, 4)).as_deref(),
            Some("r")
        );
        assert_eq!(language_at_position(&tokens, Position::new(4, 0)), None);
    }

    #[test]
    fn first_matching_block_wins() {
        let text = "```{python}\na\n```\n\n```{r}\nb\n```\n";
        let tokens = Tokenizer::new().tokenize(text);
        assert_eq!(
            language_at_position(&tokens, Position::new(1, 0)).as_deref(),
            Some("python")
        );
        assert_eq!(
            language_at_position(&tokens, Position::new(5, 0)).as_deref(),
            Some("r")
        );
        assert_eq!(
            blocks_of_language(&tokens, &LanguageRegistry::default(), "r").count(),
            1
        );
    }

    #[test]
    fn blocks_of_language_resolves_aliases() {
        let text = "```{js}\na\n```\n\n```{javascript}\nb\n```\n\n```{ojs}\nc\n```\n";
        let tokens = Tokenizer::new().tokenize(text);
        let registry = LanguageRegistry::default();

        let starts: Vec<_> = blocks_of_language(&tokens, &registry, "javascript")
            .map(|token| token.body.start)
            .collect();
        assert_eq!(starts, vec![1, 5]);
        assert_eq!(blocks_of_language(&tokens, &registry, "js").count(), 0);
    }

    #[test]
    fn indented_code_has_no_language() {
        let tokens = Tokenizer::new().tokenize("Text\n\n    python_code()\n");
        assert_eq!(language_at_position(&tokens, Position::new(2, 6)), None);
    }
}
