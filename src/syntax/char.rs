pub trait ESCharExt {
    fn is_es_newline(self) -> bool;
    fn is_es_identifier_start(self) -> bool;
    fn is_es_identifier_continue(self) -> bool;
}

impl ESCharExt for char {
    fn is_es_newline(self) -> bool {
        matches!(self, '\u{000a}' | '\u{000d}' | '\u{2028}' | '\u{2029}')
    }

    fn is_es_identifier_start(self) -> bool {
        match self {
            '$' | '_' => true,
            c => unic_ucd_ident::is_id_start(c),
        }
    }

    fn is_es_identifier_continue(self) -> bool {
        match self {
            '$' | '_' => true,
            c => unic_ucd_ident::is_id_continue(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ESCharExt;

    #[test]
    fn line_break_is_not_identifier_continue() {
        assert!(!'\n'.is_es_identifier_continue());
        assert!(!'\r'.is_es_identifier_continue());
    }

    #[test]
    fn dollar_and_underscore_start_identifiers() {
        assert!('$'.is_es_identifier_start());
        assert!('_'.is_es_identifier_start());
        assert!(!'1'.is_es_identifier_start());
    }
}
