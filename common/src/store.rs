use std::{
    fs::{self, File},
    io::{self, BufRead, BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};

use crate::kv::KeyValue;

/// Directorio compartido donde los maps dejan sus particiones y los reduces
/// su salida final.
///
/// Nombres:
///   - intermedio `(m, r)` -> `mr-<m>-<r>` (JSONL, un `KeyValue` por línea)
///   - salida `r`          -> `mr-out-<r>` (`"<clave> <valor>\n"`)
///
/// Toda escritura va primero a un temporal en el mismo directorio y después
/// se renombra encima del nombre final, así que un lector nunca ve un
/// archivo a medio escribir.
#[derive(Debug, Clone)]
pub struct IntermediateStore {
    dir: PathBuf,
}

impl IntermediateStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn intermediate_path(&self, map_index: usize, reduce_index: usize) -> PathBuf {
        self.dir.join(format!("mr-{}-{}", map_index, reduce_index))
    }

    pub fn output_path(&self, reduce_index: usize) -> PathBuf {
        self.dir.join(format!("mr-out-{}", reduce_index))
    }

    /// Escribe la partición `reduce_index` del map `map_index`, pisando
    /// lo que hubiera (una re-ejecución genera el mismo contenido).
    pub fn write_intermediate(
        &self,
        map_index: usize,
        reduce_index: usize,
        records: &[KeyValue],
    ) -> io::Result<()> {
        let target = self.intermediate_path(map_index, reduce_index);
        self.write_atomically(&target, |w| {
            for kv in records {
                serde_json::to_writer(&mut *w, kv)?;
                w.write_all(b"\n")?;
            }
            Ok(())
        })
    }

    /// Lee un intermedio. `Ok(None)` si el archivo no existe: el map no
    /// dejó nada para esta partición y eso no es un error.
    pub fn read_intermediate(
        &self,
        map_index: usize,
        reduce_index: usize,
    ) -> io::Result<Option<Vec<KeyValue>>> {
        let path = self.intermediate_path(map_index, reduce_index);
        let file = match File::open(&path) {
            Ok(f) => f,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e),
        };

        let reader = BufReader::new(file);
        let mut out = Vec::new();
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let kv: KeyValue = serde_json::from_str(&line)?;
            out.push(kv);
        }

        Ok(Some(out))
    }

    /// Borra un intermedio. Si no existe no pasa nada.
    pub fn remove_intermediate(&self, map_index: usize, reduce_index: usize) -> io::Result<()> {
        match fs::remove_file(self.intermediate_path(map_index, reduce_index)) {
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            other => other,
        }
    }

    /// Escribe la salida final de la partición `reduce_index`.
    pub fn write_output<'a, I>(&self, reduce_index: usize, lines: I) -> io::Result<()>
    where
        I: IntoIterator<Item = (&'a str, String)>,
    {
        let target = self.output_path(reduce_index);
        self.write_atomically(&target, |w| {
            for (key, value) in lines {
                writeln!(w, "{} {}", key, value)?;
            }
            Ok(())
        })
    }

    /// Lista las salidas `mr-out-*` presentes, ordenadas por partición.
    pub fn output_files(&self) -> io::Result<Vec<PathBuf>> {
        let mut found: Vec<(usize, PathBuf)> = Vec::new();
        for entry in fs::read_dir(&self.dir)?.flatten() {
            if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
                continue;
            }
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if let Some(idx) = name
                .strip_prefix("mr-out-")
                .and_then(|s| s.parse::<usize>().ok())
            {
                found.push((idx, entry.path()));
            }
        }
        found.sort_by_key(|(idx, _)| *idx);
        Ok(found.into_iter().map(|(_, p)| p).collect())
    }

    fn write_atomically<F>(&self, target: &Path, fill: F) -> io::Result<()>
    where
        F: FnOnce(&mut BufWriter<&File>) -> io::Result<()>,
    {
        fs::create_dir_all(&self.dir)?;

        let prefix = target
            .file_name()
            .map(|n| format!("{}.", n.to_string_lossy()))
            .unwrap_or_else(|| "mr.".to_string());
        let tmp = tempfile::Builder::new()
            .prefix(&prefix)
            .suffix(".tmp")
            .tempfile_in(&self.dir)?;

        {
            let mut writer = BufWriter::new(tmp.as_file());
            fill(&mut writer)?;
            writer.flush()?;
        }
        tmp.as_file().sync_all()?;

        tmp.persist(target).map_err(|e| e.error)?;
        Ok(())
    }
}
