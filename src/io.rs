use std::{
    collections::BTreeSet,
    io::{Read, Write},
};

use bit_set::BitSet;
use itertools::Itertools;
use thiserror::Error;
use tracing::debug;

use crate::{
    automaton::{Acceptance, AcceptanceKind, Transitions},
    math::Bijection,
    morphism::Morphism,
    OmalgError, OmegaAutomaton, OmegaSemigroup, Semigroup,
};

/// Errors raised while reading the omalg text format.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The input does not follow the format. `line` is the 1-based line on which the
    /// offending section starts.
    #[error("syntax error in line {line}: {hint}")]
    Syntax {
        /// Line of the offending section.
        line: usize,
        /// What went wrong.
        hint: String,
    },
    /// Reading the input failed.
    #[error("could not read input: {0}")]
    Io(#[from] std::io::Error),
    /// The input is well formed but describes an invalid object.
    #[error(transparent)]
    Structure(#[from] OmalgError),
}

fn is_separator(c: char) -> bool {
    c == ',' || c.is_whitespace()
}

fn tokens(text: &str) -> Vec<&str> {
    text.split(is_separator).filter(|t| !t.is_empty()).collect()
}

/// A `;` terminated piece of the input.
#[derive(Debug, Clone, Copy)]
struct Section<'a> {
    line: usize,
    text: &'a str,
}

impl<'a> Section<'a> {
    fn error<S: Into<String>>(&self, hint: S) -> ParseError {
        ParseError::Syntax {
            line: self.line,
            hint: hint.into(),
        }
    }

    fn keyword(&self) -> String {
        self.text.trim().to_lowercase()
    }

    fn names(&self) -> Vec<&'a str> {
        tokens(self.text)
    }

    /// Parses a list of groups like `(p,a,q),(q,b,p)`, returning the entries of each group.
    fn groups(&self, open: char, close: char) -> Result<Vec<Vec<&'a str>>, ParseError> {
        let mut rest = self.text.trim_start_matches(is_separator);
        let mut groups = vec![];
        while !rest.is_empty() {
            let (inner, tail) = rest
                .strip_prefix(open)
                .and_then(|r| r.split_once(close))
                .ok_or_else(|| self.error(format!("expected a group `{open}...{close}`")))?;
            groups.push(tokens(inner));
            rest = tail.trim_start_matches(is_separator);
        }
        Ok(groups)
    }

    /// Assigns indices to the names in order, rejecting duplicates.
    fn index_names(&self, what: &str) -> Result<Bijection<String, usize>, ParseError> {
        let mut indices = Bijection::new();
        for (i, name) in self.names().into_iter().enumerate() {
            if indices.insert_no_overwrite(name.to_string(), i).is_err() {
                return Err(self.error(format!("{what} `{name}` is declared twice")));
            }
        }
        Ok(indices)
    }

    /// Rejects names containing one of the `reserved` characters.
    fn reject_reserved(&self, what: &str, reserved: &[char]) -> Result<(), ParseError> {
        match self.names().into_iter().find(|name| name.contains(reserved)) {
            Some(name) => Err(self.error(format!(
                "{what} name `{name}` contains one of {}",
                reserved.iter().join(" ")
            ))),
            None => Ok(()),
        }
    }

    fn lookup(
        &self,
        indices: &Bijection<String, usize>,
        what: &str,
        name: &str,
    ) -> Result<usize, ParseError> {
        indices
            .get_by_left(name)
            .copied()
            .ok_or_else(|| self.error(format!("unknown {what} `{name}`")))
    }

    fn lookup_all(
        &self,
        indices: &Bijection<String, usize>,
        what: &str,
    ) -> Result<Vec<usize>, ParseError> {
        self.names()
            .into_iter()
            .map(|name| self.lookup(indices, what, name))
            .collect()
    }

    fn single(&self, what: &str) -> Result<&'a str, ParseError> {
        match self.names()[..] {
            [name] => Ok(name),
            _ => Err(self.error(format!("expected exactly one {what}"))),
        }
    }
}

/// Splits the input into its sections and hands them out one after another.
struct Sections<'a> {
    sections: std::vec::IntoIter<Section<'a>>,
    last_line: usize,
}

impl<'a> Sections<'a> {
    fn split(input: &'a str) -> Result<Self, ParseError> {
        let mut line = 1;
        let mut sections = vec![];
        let mut pieces = input.split(';').peekable();
        while let Some(text) = pieces.next() {
            let leading = text.len() - text.trim_start().len();
            let start = line + text[..leading].matches('\n').count();
            line += text.matches('\n').count();
            if pieces.peek().is_some() {
                sections.push(Section { line: start, text });
            } else if !text.trim().is_empty() {
                return Err(ParseError::Syntax {
                    line: start,
                    hint: "section is not terminated by `;`".into(),
                });
            }
        }
        Ok(Self {
            sections: sections.into_iter(),
            last_line: line,
        })
    }

    fn next(&mut self, what: &str) -> Result<Section<'a>, ParseError> {
        self.sections.next().ok_or_else(|| ParseError::Syntax {
            line: self.last_line,
            hint: format!("unexpected end of input, expected {what}"),
        })
    }

    fn finish(mut self) -> Result<(), ParseError> {
        match self.sections.next() {
            None => Ok(()),
            Some(section) => Err(section.error("unexpected section after the end of the object")),
        }
    }
}

/// Parses an automaton of any of the eight classes from the omalg text format, see
/// [`OmegaAutomaton::description`].
///
/// # Examples
/// ```
/// use omalg::{io::parse_automaton, upw};
///
/// let dba = parse_automaton(
///     "Buechi; Deterministic; q0,q1; q0; a,b;
///      (q0,a,q1),(q0,b,q0),(q1,a,q1),(q1,b,q0); q1;",
/// )
/// .unwrap();
/// assert!(dba.accepts(&upw!([0, 1])));
/// ```
pub fn parse_automaton(input: &str) -> Result<OmegaAutomaton, ParseError> {
    let mut sections = Sections::split(input)?;

    let section = sections.next("acceptance kind")?;
    let kind = match section.keyword().as_str() {
        "buechi" => AcceptanceKind::Buchi,
        "cobuechi" => AcceptanceKind::CoBuchi,
        "parity" => AcceptanceKind::Parity,
        "muller" => AcceptanceKind::Muller,
        _ => {
            return Err(section.error("expected one of Buechi, CoBuechi, Parity or Muller"));
        }
    };
    let section = sections.next("determinism")?;
    let deterministic = match section.keyword().as_str() {
        "deterministic" => true,
        "nondeterministic" => false,
        _ => return Err(section.error("expected Deterministic or Nondeterministic")),
    };

    let section = sections.next("state names")?;
    let states = section.index_names("state")?;
    section.reject_reserved("state", &['(', ')', '{', '}'])?;
    if states.is_empty() {
        return Err(section.error("an automaton needs at least one state"));
    }
    let section = sections.next("initial state")?;
    let initial = section.lookup(&states, "state", section.single("initial state")?)?;
    let section = sections.next("alphabet")?;
    let alphabet = section.index_names("letter")?;

    let (n, k) = (states.len(), alphabet.len());
    let section = sections.next("transitions")?;
    let mut triples = vec![];
    for group in section.groups('(', ')')? {
        let [origin, letter, target] = group[..] else {
            return Err(section.error(format!(
                "a transition consists of origin, letter and target, found `({})`",
                group.iter().join(",")
            )));
        };
        triples.push((
            section.lookup(&states, "state", origin)?,
            section.lookup(&alphabet, "letter", letter)?,
            section.lookup(&states, "state", target)?,
        ));
    }
    let transitions = if deterministic {
        let mut table = vec![vec![None; k]; n];
        for (q, a, t) in triples {
            if table[q][a].replace(t).is_some() {
                return Err(section.error(format!(
                    "state `{}` has more than one transition on `{}`",
                    names(&states)[q],
                    names(&alphabet)[a]
                )));
            }
        }
        let mut complete = Vec::with_capacity(n);
        for (q, row) in table.into_iter().enumerate() {
            let row: Option<Vec<usize>> = row.into_iter().collect();
            complete.push(row.ok_or_else(|| {
                section.error(format!(
                    "state `{}` lacks a transition for some letter",
                    names(&states)[q]
                ))
            })?);
        }
        Transitions::Deterministic(complete)
    } else {
        let mut relation = vec![vec![BTreeSet::new(); k]; n];
        for (q, a, t) in triples {
            relation[q][a].insert(t);
        }
        Transitions::Nondeterministic(relation)
    };

    let section = sections.next("acceptance condition")?;
    let acceptance = match kind {
        AcceptanceKind::Buchi | AcceptanceKind::CoBuchi => {
            let finals: BitSet = section.lookup_all(&states, "state")?.into_iter().collect();
            if kind == AcceptanceKind::Buchi {
                Acceptance::Buchi(finals)
            } else {
                Acceptance::CoBuchi(finals)
            }
        }
        AcceptanceKind::Parity => {
            let priorities = section
                .names()
                .into_iter()
                .map(|p| {
                    p.parse::<usize>()
                        .map_err(|_| section.error(format!("`{p}` is not a priority")))
                })
                .collect::<Result<Vec<_>, _>>()?;
            if priorities.len() != n {
                return Err(section.error(format!(
                    "expected one priority for each of the {n} states, found {}",
                    priorities.len()
                )));
            }
            Acceptance::Parity(priorities)
        }
        AcceptanceKind::Muller => {
            let mut table = BTreeSet::new();
            for group in section.groups('{', '}')? {
                let set = group
                    .into_iter()
                    .map(|q| section.lookup(&states, "state", q))
                    .collect::<Result<BTreeSet<_>, _>>()?;
                table.insert(set);
            }
            Acceptance::Muller(table)
        }
    };
    sections.finish()?;

    debug!("parsed automaton with {n} states over {k} letters");
    Ok(OmegaAutomaton::new(
        names(&states),
        names(&alphabet),
        initial,
        transitions,
        acceptance,
    )?)
}

/// Parses an omega-semigroup from the omalg text format, see
/// [`OmegaSemigroup::description`]. Table rows may be separated by commas or line breaks.
pub fn parse_omega_semigroup(input: &str) -> Result<OmegaSemigroup, ParseError> {
    let mut sections = Sections::split(input)?;

    let section = sections.next("element names")?;
    let elements = section.index_names("element")?;
    // element names end up in state names of the constructed automata
    section.reject_reserved("element", &['|', '(', ')', '{', '}'])?;
    let n = elements.len();
    let section = sections.next("product table")?;
    let products = table(&section, &elements, "element", n, n)?;

    let section = sections.next("infinite element names")?;
    let omegas = section.index_names("infinite element")?;
    let m = omegas.len();
    let section = sections.next("mixed product table")?;
    let mixed = table(&section, &omegas, "infinite element", n, m)?;
    let section = sections.next("omega iteration table")?;
    let iterations = section.lookup_all(&omegas, "infinite element")?;
    if iterations.len() != n {
        return Err(section.error(format!(
            "expected one omega iteration for each of the {n} elements"
        )));
    }

    let section = sections.next("alphabet")?;
    let alphabet = section.index_names("letter")?;
    let section = sections.next("morphism")?;
    let images = section.lookup_all(&elements, "element")?;
    if images.len() != alphabet.len() {
        return Err(section.error(format!(
            "expected one image for each of the {} letters",
            alphabet.len()
        )));
    }

    let section = sections.next("accepting set")?;
    let mut accepting = vec![false; m];
    for w in section.lookup_all(&omegas, "infinite element")? {
        accepting[w] = true;
    }
    sections.finish()?;

    debug!("parsed omega-semigroup with {n} finite and {m} infinite elements");
    let s_plus = Semigroup::new(names(&elements), products)?;
    let phi = Morphism::new(images, names(&alphabet))?;
    Ok(OmegaSemigroup::new(
        s_plus,
        names(&omegas),
        mixed,
        iterations,
        accepting,
        phi,
    )?)
}

/// Reads a whole table in row-major order.
fn table(
    section: &Section<'_>,
    indices: &Bijection<String, usize>,
    what: &str,
    rows: usize,
    columns: usize,
) -> Result<Vec<Vec<usize>>, ParseError> {
    let entries = section.lookup_all(indices, what)?;
    if entries.len() != rows * columns {
        return Err(section.error(format!(
            "expected a {rows}x{columns} table, found {} entries",
            entries.len()
        )));
    }
    if columns == 0 {
        return Ok(vec![vec![]; rows]);
    }
    Ok(entries.chunks(columns).map(<[usize]>::to_vec).collect())
}

/// The names in index order.
fn names(indices: &Bijection<String, usize>) -> Vec<String> {
    indices
        .iter()
        .sorted_by_key(|&(_, &i)| i)
        .map(|(name, _)| name.clone())
        .collect()
}

/// Reads the whole input and parses an automaton from it.
pub fn read_automaton<R: Read>(mut reader: R) -> Result<OmegaAutomaton, ParseError> {
    let mut input = String::new();
    reader.read_to_string(&mut input)?;
    parse_automaton(&input)
}

/// Reads the whole input and parses an omega-semigroup from it.
pub fn read_omega_semigroup<R: Read>(mut reader: R) -> Result<OmegaSemigroup, ParseError> {
    let mut input = String::new();
    reader.read_to_string(&mut input)?;
    parse_omega_semigroup(&input)
}

/// Writes the description of the automaton followed by a line break.
pub fn write_automaton<W: Write>(
    mut writer: W,
    automaton: &OmegaAutomaton,
) -> std::io::Result<()> {
    writeln!(writer, "{}", automaton.description())
}

/// Writes the description of the omega-semigroup followed by a line break.
pub fn write_omega_semigroup<W: Write>(
    mut writer: W,
    semigroup: &OmegaSemigroup,
) -> std::io::Result<()> {
    writeln!(writer, "{}", semigroup.description())
}

#[cfg(test)]
mod tests {
    use super::{
        parse_automaton, parse_omega_semigroup, read_automaton, write_automaton, ParseError,
    };
    use crate::{automaton, omega_semigroup, OmegaAutomaton};

    fn syntax_line(result: Result<OmegaAutomaton, ParseError>) -> usize {
        match result {
            Err(ParseError::Syntax { line, .. }) => line,
            other => panic!("expected a syntax error, got {other:?}"),
        }
    }

    #[test]
    fn automata_survive_a_round_trip() {
        let muller = OmegaAutomaton::nondeterministic_muller(
            vec!["p".into(), "q".into()],
            vec!["x".into(), "y".into()],
            0,
            vec![vec![vec![0, 1], vec![]], vec![vec![], vec![0]]],
            vec![vec![0, 1], vec![0], vec![]],
        )
        .unwrap();
        for aut in [
            automaton::tests::infinitely_many_a(),
            automaton::tests::finitely_many_b(),
            automaton::tests::infinitely_many_a().dual().unwrap(),
            omega_semigroup::tests::infinitely_many_a().to_parity(),
            muller,
        ] {
            assert_eq!(parse_automaton(&aut.description()).unwrap(), aut);
        }
    }

    #[test]
    fn omega_semigroups_survive_a_round_trip() {
        let generated = automaton::tests::finitely_many_b().to_omega_semigroup();
        for os in [
            omega_semigroup::tests::infinitely_many_a(),
            omega_semigroup::tests::single_idempotent(),
            generated,
        ] {
            assert_eq!(parse_omega_semigroup(&os.description()).unwrap(), os);
        }
    }

    #[test]
    fn whitespace_and_case_are_ignored() {
        let dba = parse_automaton(
            "  buechi ;\n DETERMINISTIC;\n q0 , q1 ;q0;\n a, b ;\n\
             (q0, a, q1), (q0,b,q0),\n(q1,a,q1),\n(q1,b,q0)\n;\nq1\n;\n",
        )
        .unwrap();
        assert_eq!(dba, automaton::tests::infinitely_many_a());
        assert!(dba.accepts(&upw!([1], [0, 1])));
    }

    #[test]
    fn syntax_errors_report_the_section_line() {
        let missing = "Buechi;\nDeterministic;\nq0,q1;\nq0;\na,b;\n(q0,a,q1),(q0,b,q0),\n(q1,a,q1);\nq1;";
        assert_eq!(syntax_line(parse_automaton(missing)), 6);

        let twice = "Buechi;\nDeterministic;\nq0;\nq0;\na;\n(q0,a,q0),(q0,a,q0);\nq0;";
        assert_eq!(syntax_line(parse_automaton(twice)), 6);

        assert_eq!(syntax_line(parse_automaton("Rabin;\nDeterministic;")), 1);
        assert_eq!(syntax_line(parse_automaton("Buechi;\nDeterministic;\nq0;\nq1;")), 4);
        assert_eq!(syntax_line(parse_automaton("Buechi;\n\nmaybe;")), 3);
        assert_eq!(syntax_line(parse_automaton("Buechi;\nDeterministic;\nq0;\nq0")), 4);
        assert_eq!(syntax_line(parse_automaton("Buechi;\nDeterministic;\n")), 3);
        assert_eq!(
            syntax_line(parse_automaton(
                "Parity;\nDeterministic;\nq0;\nq0;\na;\n(q0,a,q0);\n1,2;"
            )),
            7
        );
        assert_eq!(
            syntax_line(parse_automaton(
                "Buechi;\nDeterministic;\nq0;\nq0;\na;\n(q0,a,q0);\nq0;\nextra;"
            )),
            8
        );
    }

    #[test]
    fn semigroup_tables_are_checked() {
        let empty_p = parse_omega_semigroup("a;\na;\nw;\nw;\nw;\nx;\na;\n;\n").unwrap();
        assert!(!empty_p.accepts(&upw!([0])));

        let wrong_size = parse_omega_semigroup("a,b;\na,b;\nw;\nw\nw;\nw,w;\nx;\na;\nw;");
        assert!(matches!(wrong_size, Err(ParseError::Syntax { line: 2, .. })));
        let unknown = parse_omega_semigroup("a;\na;\nw;\nw;\nw;\nx;\nb;\nw;");
        assert!(matches!(unknown, Err(ParseError::Syntax { line: 7, .. })));
    }

    #[test]
    fn element_names_must_not_clash_in_state_names() {
        let pipe = "a|b,a,b;\na|b,a|b,a|b,a|b,a,a|b,a|b,a|b,b;\nw;\nw,w,w;\nw,w,w;\nx;\na;\nw;";
        assert!(matches!(
            parse_omega_semigroup(pipe),
            Err(ParseError::Syntax { line: 1, .. })
        ));
        let bracket = "(a);\n(a);\nw;\nw;\nw;\nx;\n(a);\nw;";
        assert!(matches!(
            parse_omega_semigroup(bracket),
            Err(ParseError::Syntax { line: 1, .. })
        ));

        let os = parse_omega_semigroup("a;\na;\n(a)^w;\n(a)^w;\n(a)^w;\nx;\na;\n(a)^w;").unwrap();
        for aut in [os.to_parity(), os.to_det_buechi().unwrap()] {
            assert_eq!(parse_automaton(&aut.description()).unwrap(), aut);
        }
    }

    #[test]
    fn reading_and_writing() {
        let aut = automaton::tests::finitely_many_b();
        let mut buffer = vec![];
        write_automaton(&mut buffer, &aut).unwrap();
        assert_eq!(read_automaton(buffer.as_slice()).unwrap(), aut);
    }
}
