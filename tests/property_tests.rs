use magick_squeeze::{
    resolve_output_path, split_filename, validate_input_filename, CompressionError, ImageKind,
    MagickConverter,
};
use proptest::prelude::*;
use std::fs::File;
use std::path::Path;
use tempfile::TempDir;

fn mixed_case(ext: &'static str) -> impl Strategy<Value = String> {
    prop::collection::vec(any::<bool>(), ext.len()).prop_map(move |upper| {
        ext.chars()
            .zip(upper)
            .map(|(c, u)| if u { c.to_ascii_uppercase() } else { c })
            .collect()
    })
}

proptest! {
    #[test]
    fn accepted_extensions_any_case(
        stem in "[a-zA-Z0-9_-]{1,12}",
        ext in prop_oneof![mixed_case("png"), mixed_case("jpg"), mixed_case("jpeg")]
    ) {
        let filename = format!("{}.{}", stem, ext);
        prop_assert!(validate_input_filename(&filename).is_ok());
        prop_assert!(ImageKind::from_filename(&filename).is_ok());
    }

    #[test]
    fn other_extensions_are_unsupported(
        stem in "[a-zA-Z0-9_-]{1,12}",
        ext in "[a-z]{1,5}"
    ) {
        prop_assume!(!matches!(ext.as_str(), "png" | "jpg" | "jpeg"));
        let filename = format!("{}.{}", stem, ext);
        prop_assert!(
            matches!(validate_input_filename(&filename), Err(CompressionError::UnsupportedFormat(_))),
            "expected {} to be unsupported",
            filename
        );
    }

    #[test]
    fn names_without_dot_are_invalid(name in "[a-zA-Z0-9_-]{1,16}") {
        prop_assert!(matches!(
            validate_input_filename(&name),
            Err(CompressionError::InvalidFilename(_))
        ));
    }

    #[test]
    fn split_filename_rejoins(stem in "[a-z.]{0,8}", ext in "[a-z]{0,4}") {
        let filename = format!("{}.{}", stem, ext);
        let (s, e) = split_filename(&filename).unwrap();
        prop_assert_eq!(format!("{}.{}", s, e), filename.clone());
        prop_assert!(!e.contains('.'));
    }

    #[test]
    fn quality_is_passed_through(quality in any::<i32>()) {
        let cmd = MagickConverter::new("magick").command(Path::new("a.jpg"), Path::new("b.jpg"), quality);
        let args: Vec<String> = cmd.get_args().map(|a| a.to_string_lossy().into_owned()).collect();
        prop_assert_eq!(&args[2], "-quality");
        prop_assert_eq!(&args[3], &quality.to_string());
    }

    #[test]
    fn resolved_path_never_exists(taken in 0usize..6, stem in "[a-z]{1,8}") {
        let temp_dir = TempDir::new().unwrap();
        let filename = format!("{}.jpg", stem);
        File::create(temp_dir.path().join(&filename)).unwrap();
        for n in 1..=taken {
            File::create(temp_dir.path().join(format!("{}_out_{}.jpg", stem, n))).unwrap();
        }

        let path = resolve_output_path(Some(temp_dir.path()), &filename).unwrap();

        prop_assert!(!path.exists());
        prop_assert_eq!(path, temp_dir.path().join(format!("{}_out_{}.jpg", stem, taken + 1)));
    }

    #[test]
    fn image_kind_matches_extension(ext in prop::sample::select(&["png", "PNG", "jpg", "JPEG", "jpeg"])) {
        let kind = ImageKind::from_filename(&format!("x.{}", ext)).unwrap();
        let expected = if ext.eq_ignore_ascii_case("png") { ImageKind::Png } else { ImageKind::Jpeg };
        prop_assert_eq!(kind, expected);
    }
}
