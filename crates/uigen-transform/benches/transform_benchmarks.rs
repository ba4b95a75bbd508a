use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use uigen_core::PreviewConfig;
use uigen_files::{FilePath, FilesBuilder, VirtualFileSystem};
use uigen_transform::{TransformEngine, transform_source};

fn component(i: usize) -> String {
    format!(
        "import {{ useState }} from 'react';\nimport Icon from '@/components/icons/Icon{i}';\n\nexport default function Widget{i}({{ items }}) {{\n  const [open, setOpen] = useState(false);\n  return (\n    <div className=\"rounded p-4\">\n      <button onClick={{() => setOpen(!open)}}>Toggle</button>\n      {{open && (\n        <ul>\n          {{items.map((item) => <li key={{item.id}}><Icon /> {{item.label}}</li>)}}\n        </ul>\n      )}}\n    </div>\n  );\n}}\n"
    )
}

fn create_project(count: usize) -> VirtualFileSystem {
    FilesBuilder::new()
        .add_files((0..count).map(|i| (format!("/components/Widget{i}.jsx"), component(i))))
        .build()
        .unwrap()
}

/// Benchmark a single uncached transform
fn bench_transform_source(c: &mut Criterion) {
    let path = FilePath::new("/components/Widget0.jsx").unwrap();
    let source = component(0);

    c.bench_function("transform_source", |b| {
        b.iter(|| transform_source(black_box(&path), black_box(&source), "@/").unwrap());
    });
}

/// Benchmark a warm-cache pass over a whole tree
fn bench_transform_all_cached(c: &mut Criterion) {
    let mut group = c.benchmark_group("transform_all_cached");

    for size in [10, 100] {
        let vfs = create_project(size);
        let mut engine = TransformEngine::new(&PreviewConfig::default()).unwrap();
        engine.transform_all(&vfs);

        group.bench_with_input(BenchmarkId::new("files", size), &vfs, |b, vfs| {
            b.iter(|| engine.transform_all(black_box(vfs)).len());
        });
    }

    group.finish();
}

/// Benchmark a cold pass over a whole tree
fn bench_transform_all_cold(c: &mut Criterion) {
    let mut group = c.benchmark_group("transform_all_cold");

    for size in [10, 100] {
        let vfs = create_project(size);

        group.bench_with_input(BenchmarkId::new("files", size), &vfs, |b, vfs| {
            b.iter(|| {
                let mut engine = TransformEngine::new(&PreviewConfig::default()).unwrap();
                engine.transform_all(black_box(vfs)).len()
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_transform_source,
    bench_transform_all_cached,
    bench_transform_all_cold
);
criterion_main!(benches);
