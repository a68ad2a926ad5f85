use crate::{
    runtime::Value::ClosureValue,
    syntax::tree::{
        CondBranch,
        Expr::{self, *},
        Ident, MatchCase,
    },
};
use std::collections::HashMap;

/// Captured sub-terms of a successful match, by capture name.
pub type Bindings = HashMap<Ident, Expr>;

pub(crate) trait Matcher {
    type Input;
    type Records;
    type Selected;

    fn try_match(&self, input: &Self::Input) -> Option<(Self::Records, &Self::Selected)>;
}

impl Matcher for MatchCase {
    type Input = Expr;
    type Records = Bindings;
    type Selected = Expr;

    fn try_match(&self, input: &Self::Input) -> Option<(Self::Records, &Self::Selected)> {
        match_pattern(input, &self.0).map(|records| (records, &self.1))
    }
}

impl<T: Matcher> Matcher for Vec<T> {
    type Input = T::Input;
    type Records = T::Records;
    type Selected = T::Selected;

    fn try_match(&self, input: &Self::Input) -> Option<(Self::Records, &Self::Selected)> {
        self.iter().find_map(|matcher| matcher.try_match(input))
    }
}

/// Structurally matches `source` against `pattern`.
///
/// `_` and `___` match anything. `(capture p name)` matches whatever `p`
/// matches and records the matched source under `name`. Nodes with the same
/// head are matched child by child; a trailing `___` in a list pattern
/// absorbs the remaining elements. Anything else has to be equal.
pub fn match_pattern(source: &Expr, pattern: &Expr) -> Option<Bindings> {
    let mut records = Bindings::new();
    if match_into(source, pattern, &mut records) {
        Some(records)
    } else {
        None
    }
}

fn match_into(source: &Expr, pattern: &Expr, records: &mut Bindings) -> bool {
    match pattern {
        Wildcard | WildcardSeq => true,

        CaptureExpr(inner, name) => {
            // A concrete capture node never matches a copy of itself.
            if source == pattern && !inner.is_wildcard() {
                return false;
            }
            if !match_into(source, inner, records) {
                return false;
            }
            records.insert(name.clone(), source.clone());
            true
        }

        _ => match_structure(source, pattern, records),
    }
}

fn match_structure(source: &Expr, pattern: &Expr, records: &mut Bindings) -> bool {
    match (source, pattern) {
        (LambdaExpr(sp, sb), LambdaExpr(pp, pb)) => sp == pp && match_into(sb, pb, records),
        (ValueExpr(value), LambdaExpr(pp, pb)) => match &**value {
            ClosureValue(closure) => closure.params == *pp && match_into(&closure.body, pb, records),
            _ => false,
        },
        (DefineExpr(sn, sv), DefineExpr(pn, pv)) => sn == pn && match_into(sv, pv, records),
        (CallExpr(sf, sa), CallExpr(pf, pa)) => {
            match_into(sf, pf, records) && match_all(sa, pa, records)
        }
        (BlockExpr(s), BlockExpr(p)) => match_all(s, p, records),
        (IfExpr(sc, st, se), IfExpr(pc, pt, pe)) => {
            match_into(sc, pc, records)
                && match_into(st, pt, records)
                && match_into(se, pe, records)
        }
        (CondExpr(sb, se), CondExpr(pb, pe)) => {
            sb.len() == pb.len()
                && sb
                    .iter()
                    .zip(pb)
                    .all(|(CondBranch(sc, sr), CondBranch(pc, pr))| {
                        match_into(sc, pc, records) && match_into(sr, pr, records)
                    })
                && match_into(se, pe, records)
        }
        (BinaryExpr(so, s), BinaryExpr(po, p)) => so == po && match_all(s, p, records),
        (QuoteExpr(s), QuoteExpr(p)) | (EvalExpr(s), EvalExpr(p)) => match_into(s, p, records),
        (PrintlnExpr(s), PrintlnExpr(p)) => match_into(s, p, records),
        (MatchExpr(sm, sc, sd), MatchExpr(pm, pc, pd)) => {
            match_into(sm, pm, records)
                && sc.len() == pc.len()
                && sc
                    .iter()
                    .zip(pc)
                    .all(|(MatchCase(sp, sr), MatchCase(pp, pr))| {
                        match_into(sp, pp, records) && match_into(sr, pr, records)
                    })
                && match (sd, pd) {
                    (Some(s), Some(p)) => match_into(s, p, records),
                    (None, None) => true,
                    _ => false,
                }
        }
        (ListExpr(s), ListExpr(p)) => match_sequence(s, p, records),
        (ListOpExpr(so, sl, sa), ListOpExpr(po, pl, pa)) => {
            so == po
                && match_into(sl, pl, records)
                && match (sa, pa) {
                    (Some(s), Some(p)) => match_into(s, p, records),
                    (None, None) => true,
                    _ => false,
                }
        }
        _ => source == pattern,
    }
}

fn match_all(source: &[Expr], pattern: &[Expr], records: &mut Bindings) -> bool {
    source.len() == pattern.len()
        && source
            .iter()
            .zip(pattern)
            .all(|(s, p)| match_into(s, p, records))
}

fn match_sequence(source: &[Expr], pattern: &[Expr], records: &mut Bindings) -> bool {
    match pattern.split_last() {
        Some((last, init)) if is_rest(last) => {
            if source.len() < init.len() {
                return false;
            }
            let (front, rest) = source.split_at(init.len());
            if !match_all(front, init, records) {
                return false;
            }
            if let CaptureExpr(_, name) = last {
                records.insert(name.clone(), ListExpr(rest.to_vec()));
            }
            true
        }
        _ => match_all(source, pattern, records),
    }
}

fn is_rest(pattern: &Expr) -> bool {
    match pattern {
        WildcardSeq => true,
        CaptureExpr(inner, _) => **inner == WildcardSeq,
        _ => false,
    }
}
