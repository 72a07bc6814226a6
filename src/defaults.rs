//! The bundled seed dataset used on first run and whenever the stored data version is stale.

use crate::model::{parse_year, NewEntry, WorkEntry};
use crate::Result;
use anyhow::{bail, Context};
use std::io::Cursor;

/// The version tag stamped next to persisted data. Bumping it makes every installation discard
/// its stored records and reseed from `SEED_DATA`.
pub const CURRENT_DATA_VERSION: &str = "v1";

/// Returns the seed dataset, each entry with a freshly generated id.
pub fn default_entries() -> Vec<WorkEntry> {
    seed().into_iter().map(WorkEntry::new).collect()
}

/// The seed dataset without ids. `SEED_DATA` is a compile-time constant that is covered by
/// tests, so a parse failure here is a programming error and yields an empty list.
pub fn seed() -> Vec<NewEntry> {
    match load_csv(SEED_DATA) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::error!("The bundled seed data is invalid: {e:#}");
            Vec::new()
        }
    }
}

/// Loads entries from a CSV-formatted string with `Mes,Año,Persona,Trabajo Realizado` columns.
fn load_csv(csv_data: &str) -> Result<Vec<NewEntry>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(Cursor::new(csv_data.as_bytes()));

    let mut entries = Vec::new();
    for (ix, result) in rdr.records().enumerate() {
        let record = result.with_context(|| format!("Bad seed record at row {}", ix + 2))?;
        if record.len() != 4 {
            bail!("Seed record at row {} has {} fields", ix + 2, record.len());
        }
        let year = parse_year(&record[1])
            .with_context(|| format!("Bad seed year at row {}", ix + 2))?;
        entries.push(NewEntry::new(&record[0], year, &record[2], &record[3]));
    }
    Ok(entries)
}

/// Seed work records.
const SEED_DATA: &str = r##"Mes,Año,Persona,Trabajo Realizado
Enero,2024,Carlos Rojas,Limpieza de canaletas y bajadas de agua del techo
Enero,2024,María Fernández,Revisión del sistema de bombas de agua potable
Febrero,2024,Carlos Rojas,Pintura de barandas en escaleras del bloque A
Febrero,2024,Luis Paredes,Cambio de luminarias en estacionamiento subterráneo
Marzo,2024,María Fernández,Mantención preventiva de ascensores
Marzo,2024,Jorge Salinas,Poda de árboles y limpieza de áreas verdes
Abril,2024,Luis Paredes,Reparación de citófono en portería
Abril,2024,Carlos Rojas,Sellado de filtraciones en terraza del piso 8
Mayo,2024,Jorge Salinas,Limpieza de piscina y cambio de filtro
Mayo,2024,María Fernández,Revisión de extintores y red seca
Junio,2024,Luis Paredes,Cambio de cerradura en sala de basura
Junio,2024,Carlos Rojas,Destape de alcantarillado en subterráneo
Julio,2024,Jorge Salinas,Reparación de riego automático
Agosto,2024,María Fernández,Mantención de portón eléctrico de acceso vehicular
Septiembre,2024,Carlos Rojas,Pintura de fachada norte
Octubre,2024,Luis Paredes,Instalación de sensores de movimiento en pasillos
Noviembre,2024,Jorge Salinas,Limpieza de estanques de agua
Diciembre,2024,María Fernández,Revisión general de tableros eléctricos
Enero,2025,Carlos Rojas,Reparación de baldosas en hall de entrada
Febrero,2025,Jorge Salinas,Fumigación de áreas comunes
"##;
