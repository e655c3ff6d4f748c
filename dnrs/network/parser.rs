//! Reader for the textual network description.
//!
//! The format is line oriented:
//!
//! ```text
//! c feeders around the first substation
//! p dnet 4 2
//! s section_0001 1 0.0 0.0 0.0 0.05+0.12j 0.05+0.12j 0.05+0.12j
//! s section_0002 0 6.0 6.0 6.6 0.0864+0.3678j 0.0864+0.3678j 0.0864+0.3678j
//! w switch_0001 1001
//! j section_0001 section_0002
//! j section_0002 switch_0001
//! ```
//!
//! `c` lines are comments. The `p dnet SECTIONS SWITCHES` problem line must
//! come first; the counts are cross-checked once the whole file is read.
//! `s` records carry the substation flag (0/1), three per-phase loads, and
//! three per-phase complex impedances; `w` records an optional external
//! switch number used only for reporting; `j` records a junction, i.e. the
//! set of elements electrically joined at one point.
use anyhow::{bail, Result};
use num_complex::Complex64;

use crate::network::{Element, Network, Section, SectionId, Switch, SwitchId};

/// Problem line of the network file.
#[derive(Debug, PartialEq, Eq)]
pub struct Preamble {
    pub sections: usize,
    pub switches: usize,
}

/// Current state of the network reader.
#[derive(PartialEq, Eq)]
enum NetworkReaderState {
    Initialized,
    PreambleParsed,
    ParsingRecords,
    Finished,
}

/// One record of the network file body.
#[derive(Debug, PartialEq)]
pub(crate) enum Record {
    Section(SectionId, Section),
    Switch(SwitchId, Switch),
    Junction(Vec<Element>),
}

/// Stateful reader over the textual network format.
pub struct NetworkReader<'a> {
    reader: &'a mut dyn std::io::BufRead,
    state: NetworkReaderState,
}

impl<'a> NetworkReader<'a> {
    #[must_use]
    pub fn new(reader: &'a mut dyn std::io::BufRead) -> Self {
        NetworkReader {
            reader,
            state: NetworkReaderState::Initialized,
        }
    }

    /// Parse the problem line, skipping over leading comments.
    pub fn parse_preamble(&mut self) -> Result<Preamble> {
        if self.state != NetworkReaderState::Initialized {
            bail!("preamble already parsed");
        }

        loop {
            let mut line = String::new();
            match self.reader.read_line(&mut line) {
                Ok(0) => bail!("network file is missing the 'p dnet' problem line"),
                Ok(_) => {}
                Err(err) => bail!("could not read problem line: {err}"),
            }
            let line = line.trim();
            if line.is_empty() || line.starts_with('c') {
                continue;
            }
            self.state = NetworkReaderState::PreambleParsed;
            return parse_problem_line(line);
        }
    }

    /// Parse the next body record, skipping comments and blank lines.
    pub(crate) fn parse_next_record(&mut self) -> Result<Option<Record>> {
        assert!(self.state != NetworkReaderState::Initialized);

        if self.state == NetworkReaderState::Finished {
            return Ok(None);
        }

        loop {
            let mut line = String::new();
            match self.reader.read_line(&mut line) {
                Ok(0) => {
                    self.state = NetworkReaderState::Finished;
                    return Ok(None);
                }
                Ok(_) => {}
                Err(err) => bail!("could not read record: {err}"),
            }
            let line = line.trim();
            if line.is_empty() || line.starts_with('c') {
                continue;
            }
            self.state = NetworkReaderState::ParsingRecords;
            return parse_record(line).map(Some);
        }
    }
}

/// Parse a whole network file and validate it against its preamble.
pub fn read_network(reader: &mut dyn std::io::BufRead) -> Result<Network> {
    let mut network_reader = NetworkReader::new(reader);
    let preamble = network_reader.parse_preamble()?;

    let mut network = Network::new();
    while let Some(record) = network_reader.parse_next_record()? {
        match record {
            Record::Section(id, section) => network.add_section(id, section),
            Record::Switch(id, switch) => network.add_switch(id, switch),
            Record::Junction(elements) => network.add_junction(elements),
        }
    }

    if network.section_count() != preamble.sections {
        bail!(
            "problem line announces {} sections but {} were defined",
            preamble.sections,
            network.section_count()
        );
    }
    if network.switch_count() != preamble.switches {
        bail!(
            "problem line announces {} switches but {} were defined",
            preamble.switches,
            network.switch_count()
        );
    }
    for junction in network.junctions() {
        for element in junction {
            if !network.contains(*element) {
                bail!("junction references unknown element {element}");
            }
        }
    }

    Ok(network)
}

fn parse_problem_line(line: &str) -> Result<Preamble> {
    let fields: Vec<_> = line.split_whitespace().collect();
    if fields.len() != 4 {
        bail!("problem line must contain exactly 4 fields: 'p dnet SECTIONS SWITCHES'");
    }
    if fields[0] != "p" {
        bail!("first field of problem line must be 'p'");
    }
    if fields[1] != "dnet" {
        bail!("second field of problem line must be 'dnet'");
    }

    let sections = match fields[2].parse::<usize>() {
        Ok(sections) => sections,
        Err(err) => bail!("could not parse number of sections: {err}"),
    };
    let switches = match fields[3].parse::<usize>() {
        Ok(switches) => switches,
        Err(err) => bail!("could not parse number of switches: {err}"),
    };

    Ok(Preamble { sections, switches })
}

fn parse_record(line: &str) -> Result<Record> {
    let fields: Vec<_> = line.split_whitespace().collect();
    match fields[0] {
        "s" => parse_section_record(&fields),
        "w" => parse_switch_record(&fields),
        "j" => parse_junction_record(&fields),
        kind => bail!("unknown record kind '{kind}'; expected 's', 'w' or 'j'"),
    }
}

fn parse_section_record(fields: &[&str]) -> Result<Record> {
    if fields.len() != 9 {
        bail!("section record must contain id, substation flag, 3 loads and 3 impedances");
    }

    let Element::Section(id) = parse_element(fields[1])? else {
        bail!("section record names a switch: '{}'", fields[1]);
    };
    let substation = match fields[2] {
        "0" => false,
        "1" => true,
        flag => bail!("substation flag must be 0 or 1, found '{flag}'"),
    };

    let mut load = [0.0; 3];
    for (phase, token) in fields[3..6].iter().enumerate() {
        load[phase] = match token.parse::<f64>() {
            Ok(value) => value,
            Err(err) => bail!("could not parse load '{token}': {err}"),
        };
    }

    let mut impedance = [Complex64::new(0.0, 0.0); 3];
    for (phase, token) in fields[6..9].iter().enumerate() {
        impedance[phase] = parse_complex(token)?;
    }

    Ok(Record::Section(
        id,
        Section {
            substation,
            load,
            impedance,
        },
    ))
}

fn parse_switch_record(fields: &[&str]) -> Result<Record> {
    if fields.len() != 2 && fields.len() != 3 {
        bail!("switch record must contain an id and optionally an original number");
    }

    let Element::Switch(id) = parse_element(fields[1])? else {
        bail!("switch record names a section: '{}'", fields[1]);
    };
    let original_number = match fields.get(2) {
        None => None,
        Some(token) => match token.parse::<u32>() {
            Ok(number) => Some(number),
            Err(err) => bail!("could not parse original switch number '{token}': {err}"),
        },
    };

    Ok(Record::Switch(id, Switch { original_number }))
}

fn parse_junction_record(fields: &[&str]) -> Result<Record> {
    if fields.len() < 3 {
        bail!("junction record must join at least two elements");
    }

    let elements = fields[1..]
        .iter()
        .map(|name| parse_element(name))
        .collect::<Result<Vec<_>>>()?;
    Ok(Record::Junction(elements))
}

/// Parse `section_NNNN` or `switch_NNNN` element names.
fn parse_element(name: &str) -> Result<Element> {
    let (kind, ordinal) = match name.split_once('_') {
        Some(parts) => parts,
        None => bail!("element name '{name}' must look like 'section_0001' or 'switch_0001'"),
    };
    let ordinal = match ordinal.parse::<u32>() {
        Ok(ordinal) => ordinal,
        Err(err) => bail!("could not parse ordinal of element '{name}': {err}"),
    };
    match kind {
        "section" => Ok(Element::Section(SectionId(ordinal))),
        "switch" => Ok(Element::Switch(SwitchId(ordinal))),
        _ => bail!("element name '{name}' must start with 'section' or 'switch'"),
    }
}

/// Parse an impedance token: `R`, `Xj`, `R+Xj` or `R-Xj`.
fn parse_complex(token: &str) -> Result<Complex64> {
    let parse_part = |part: &str| -> Result<f64> {
        match part.parse::<f64>() {
            Ok(value) => Ok(value),
            Err(err) => bail!("could not parse impedance '{token}': {err}"),
        }
    };

    let Some(complex) = token.strip_suffix('j') else {
        return Ok(Complex64::new(parse_part(token)?, 0.0));
    };

    // split before the sign of the imaginary part, ignoring a leading sign
    // and exponent signs such as '1e-3'
    let bytes = complex.as_bytes();
    let split = complex
        .char_indices()
        .skip(1)
        .filter(|(at, c)| {
            (*c == '+' || *c == '-') && !matches!(bytes[at - 1], b'e' | b'E')
        })
        .map(|(at, _)| at)
        .last();

    match split {
        None => Ok(Complex64::new(0.0, parse_part(complex)?)),
        Some(at) => Ok(Complex64::new(
            parse_part(&complex[..at])?,
            parse_part(&complex[at..])?,
        )),
    }
}

#[cfg(test)]
mod test {
    use num_complex::Complex64;
    use pretty_assertions::assert_eq;
    use std::io::BufReader;

    use super::{parse_complex, read_network, NetworkReader, Preamble, Record};
    use crate::network::{Element, Section, SectionId, Switch, SwitchId};

    const SMALL: &str = "c two feeders, one tie switch
c
p dnet 3 1
s section_0001 1 0.0 0.0 0.0 0.05+0.12j 0.05+0.12j 0.05+0.12j
s section_0002 0 6.0 6.0 6.6 0.0864+0.3678j 0.0864+0.3678j 0.0864+0.3678j
s section_0003 0 2.1 2.1 2.1 0.1 0.1 0.1
w switch_0001 1001
j section_0001 section_0002
j section_0002 switch_0001
j switch_0001 section_0003
";

    #[test]
    fn preamble_and_records() {
        let mut reader = BufReader::new(SMALL.as_bytes());
        let mut network_reader = NetworkReader::new(&mut reader);

        assert_eq!(
            network_reader.parse_preamble().unwrap(),
            Preamble {
                sections: 3,
                switches: 1
            }
        );

        let record = network_reader.parse_next_record().unwrap().unwrap();
        assert_eq!(
            record,
            Record::Section(
                SectionId(1),
                Section {
                    substation: true,
                    load: [0.0; 3],
                    impedance: [Complex64::new(0.05, 0.12); 3],
                }
            )
        );
    }

    #[test]
    fn whole_file() {
        let mut reader = BufReader::new(SMALL.as_bytes());
        let network = read_network(&mut reader).unwrap();

        assert_eq!(network.section_count(), 3);
        assert_eq!(network.switch_count(), 1);
        assert_eq!(
            network.switch(SwitchId(1)),
            Some(&Switch {
                original_number: Some(1001)
            })
        );
        assert!(network
            .neighbors(Element::Switch(SwitchId(1)))
            .contains(&Element::Section(SectionId(3))));
    }

    #[test]
    fn preamble_must_come_first() {
        let contents = "s section_0001 1 0 0 0 1 1 1\n";
        let mut reader = BufReader::new(contents.as_bytes());
        let mut network_reader = NetworkReader::new(&mut reader);
        assert!(network_reader.parse_preamble().is_err());
    }

    #[test]
    fn counts_are_cross_checked() {
        let contents = "p dnet 2 0
s section_0001 1 0.0 0.0 0.0 0.1 0.1 0.1
";
        let mut reader = BufReader::new(contents.as_bytes());
        let err = read_network(&mut reader).unwrap_err();
        assert!(err.to_string().contains("announces 2 sections"));
    }

    #[test]
    fn junctions_must_reference_known_elements() {
        let contents = "p dnet 1 0
s section_0001 1 0.0 0.0 0.0 0.1 0.1 0.1
j section_0001 section_0099
";
        let mut reader = BufReader::new(contents.as_bytes());
        let err = read_network(&mut reader).unwrap_err();
        assert!(err.to_string().contains("unknown element section_0099"));
    }

    #[test]
    fn complex_forms() {
        assert_eq!(parse_complex("1.5").unwrap(), Complex64::new(1.5, 0.0));
        assert_eq!(parse_complex("-0.25").unwrap(), Complex64::new(-0.25, 0.0));
        assert_eq!(parse_complex("0.5j").unwrap(), Complex64::new(0.0, 0.5));
        assert_eq!(
            parse_complex("0.0864+0.3678j").unwrap(),
            Complex64::new(0.0864, 0.3678)
        );
        assert_eq!(
            parse_complex("-1.2-3.4j").unwrap(),
            Complex64::new(-1.2, -3.4)
        );
        assert_eq!(
            parse_complex("1e-3+2e-4j").unwrap(),
            Complex64::new(1e-3, 2e-4)
        );
        assert!(parse_complex("bogus").is_err());
    }
}
