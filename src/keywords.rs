use anyhow::Result;
use std::collections::HashMap;
use std::fs;

use crate::scanner::token::TokenType;

/// Build the spelling -> token table. Each canonical keyword accepts one or
/// more spellings; the default table carries the standard spellings alongside
/// the Black Speech ones. A JSON file (canonical name -> list of spellings)
/// can replace the table wholesale.
pub fn load_keywords(path: Option<&str>) -> Result<HashMap<String, TokenType>> {
    let map: HashMap<String, Vec<String>> = match path {
        Some(p) => {
            let contents = fs::read_to_string(p)?;
            serde_json::from_str(&contents)?
        }
        None => default_keywords(),
    };

    let mut keywords = HashMap::new();
    for (canonical, spellings) in map {
        if let Some(token_type) = str_to_token_type(&canonical) {
            for spelling in spellings {
                keywords.insert(spelling, token_type.clone());
            }
        }
    }

    Ok(keywords)
}

fn default_keywords() -> HashMap<String, Vec<String>> {
    let table: [(&str, &[&str]); 12] = [
        ("and", &["and", "agh"]),
        ("or", &["or", "urz"]),
        ("not", &["not"]),
        ("if", &["if", "gul"]),
        ("elif", &["elif", "gulnakh"]),
        ("else", &["else", "skai"]),
        ("while", &["while", "arburz"]),
        ("fun", &["fun"]),
        ("return", &["return", "zagh"]),
        ("print", &["print", "krimp"]),
        ("true", &["true", "goth"]),
        ("false", &["false", "burzum"]),
    ];

    table
        .into_iter()
        .map(|(canonical, spellings)| {
            (
                canonical.to_string(),
                spellings.iter().map(|s| s.to_string()).collect(),
            )
        })
        .collect()
}

fn str_to_token_type(s: &str) -> Option<TokenType> {
    match s {
        "and" => Some(TokenType::And),
        "or" => Some(TokenType::Or),
        "not" => Some(TokenType::Not),
        "if" => Some(TokenType::If),
        "elif" => Some(TokenType::Elif),
        "else" => Some(TokenType::Else),
        "while" => Some(TokenType::While),
        "fun" => Some(TokenType::Fun),
        "return" => Some(TokenType::Return),
        "print" => Some(TokenType::Print),
        "true" => Some(TokenType::True),
        "false" => Some(TokenType::False),
        _ => None,
    }
}
