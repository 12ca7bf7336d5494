// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! `$(VAR)` expansion with the same rules the kubelet applies to container env.

const OPERATOR: char = '$';
const OPENER: char = '(';
const CLOSER: char = ')';

/// Expand `$(NAME)` references in `input`.
///
/// `$$` collapses to a single `$`, a reference `lookup` can't resolve is kept
/// verbatim, and a `$(` without closing parenthesis is copied as-is.
pub fn expand<F>(input: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(pos) = rest.find(OPERATOR) {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + OPERATOR.len_utf8()..];

        match after.chars().next() {
            None => {
                out.push(OPERATOR);
                rest = after;
            }
            Some(OPERATOR) => {
                out.push(OPERATOR);
                rest = &after[OPERATOR.len_utf8()..];
            }
            Some(OPENER) => {
                let body = &after[OPENER.len_utf8()..];
                match body.find(CLOSER) {
                    Some(end) => {
                        let name = &body[..end];
                        match lookup(name) {
                            Some(value) => out.push_str(&value),
                            None => {
                                out.push(OPERATOR);
                                out.push(OPENER);
                                out.push_str(name);
                                out.push(CLOSER);
                            }
                        }
                        rest = &body[end + CLOSER.len_utf8()..];
                    }
                    None => {
                        out.push(OPERATOR);
                        out.push(OPENER);
                        rest = body;
                    }
                }
            }
            Some(c) => {
                out.push(OPERATOR);
                out.push(c);
                rest = &after[c.len_utf8()..];
            }
        }
    }

    out.push_str(rest);
    out
}
