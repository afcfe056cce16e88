pub mod args;
pub mod op;
pub mod ops;

pub use ops::{Decrypt, Encrypt, PrintIdentity, Recall, Sign, Verify};

use args::Args;
use op::ConflictingOperations;

crate::operation_enum! {
    (Encrypt, Encrypt),
    (Decrypt, Decrypt),
    (Sign, Sign),
    (Verify, Verify),
    (PrintIdentity, PrintIdentity),
    (Recall, Recall),
}

impl Operation {
    /// Pick the single operation the flags ask for
    ///
    /// No operation flag means the identity is only resolved and reported.
    pub fn from_args(args: &Args) -> Result<Self, ConflictingOperations> {
        let requested: Vec<(&'static str, Operation)> = [
            (args.encrypt, "encrypt", Operation::Encrypt(Encrypt)),
            (args.decrypt, "decrypt", Operation::Decrypt(Decrypt)),
            (args.sign, "sign", Operation::Sign(Sign)),
            (args.verify, "verify", Operation::Verify(Verify)),
            (
                args.print_identity,
                "print-identity",
                Operation::PrintIdentity(PrintIdentity {
                    show_private: args.print_private,
                }),
            ),
        ]
        .into_iter()
        .filter(|(set, _, _)| *set)
        .map(|(_, name, op)| (name, op))
        .collect();

        if requested.len() > 1 {
            return Err(ConflictingOperations(
                requested.into_iter().map(|(name, _)| name).collect(),
            ));
        }
        Ok(requested
            .into_iter()
            .next()
            .map(|(_, op)| op)
            .unwrap_or(Operation::Recall(Recall)))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use args::Parser;

    fn parse(flags: &[&str]) -> Args {
        let mut argv = vec!["rnid", "-i", "id.pem"];
        argv.extend_from_slice(flags);
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_single_operation() {
        assert!(matches!(
            Operation::from_args(&parse(&["-e"])),
            Ok(Operation::Encrypt(_))
        ));
        assert!(matches!(
            Operation::from_args(&parse(&["-p", "-P"])),
            Ok(Operation::PrintIdentity(PrintIdentity { show_private: true }))
        ));
        assert!(matches!(
            Operation::from_args(&parse(&[])),
            Ok(Operation::Recall(_))
        ));
    }

    #[test]
    fn test_conflicting_operations() {
        let err = Operation::from_args(&parse(&["-e", "-d", "-V"])).unwrap_err();
        assert_eq!(err.0, vec!["encrypt", "decrypt", "verify"]);

        assert!(Operation::from_args(&parse(&["-s", "-p"])).is_err());
    }
}
